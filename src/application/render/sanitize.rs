use std::collections::HashSet;

use ammonia::Builder as AmmoniaBuilder;
use once_cell::sync::Lazy;

static POST_SANITIZER: Lazy<AmmoniaBuilder<'static>> = Lazy::new(build_post_sanitizer);

/// Clean rendered post markup against the post allow-list.
pub fn sanitize_html(html: &str) -> String {
    POST_SANITIZER.clean(html).to_string()
}

fn build_post_sanitizer() -> AmmoniaBuilder<'static> {
    let mut builder = AmmoniaBuilder::default();

    let tags: HashSet<&'static str> = HashSet::from([
        "a", "code", "em", "h1", "h2", "h3", "h4", "h5", "h6", "img", "p", "s", "strong", "u",
    ]);
    builder.tags(tags);

    let generic: HashSet<&'static str> = HashSet::from(["class", "id"]);
    builder.generic_attributes(generic);

    builder.add_tag_attributes("a", &["target"]);
    builder.add_tag_attributes("img", &["width", "height", "alt"]);
    builder.add_url_schemes(["http", "https", "mailto", "tel"].iter().copied());

    builder
}
