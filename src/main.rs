use std::{future::IntoFuture, process, sync::Arc};

use devscribe::{
    application::{
        chrome::ChromeService, comments::CommentService, error::AppError, posts::PostService,
        render::AssetUrlResolver, repos::ContentRepo,
    },
    cache::CacheState,
    config,
    infra::{
        cms::{SanityImageUrls, SanityRepo},
        error::InfraError,
        http::{self, HttpState},
        telemetry,
    },
};
use tokio::{signal, sync::oneshot};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let state = build_http_state(&settings)?;
    let cache_enabled = state.cache.is_enabled();
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target: "devscribe::serve",
        addr = %settings.server.addr,
        project = settings.cms.project_id.as_str(),
        dataset = settings.cms.dataset.as_str(),
        cache = cache_enabled,
        "listening"
    );

    let grace = settings.server.graceful_shutdown;
    let (signalled_tx, signalled_rx) = oneshot::channel::<()>();
    let server = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = signalled_tx.send(());
        })
        .into_future();
    tokio::pin!(server);

    // Connections still open after the grace period are dropped.
    let drain_deadline = async move {
        match signalled_rx.await {
            Ok(()) => tokio::time::sleep(grace).await,
            Err(_) => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        result = &mut server => {
            result.map_err(|err| AppError::from(InfraError::from(err)))
        }
        () = drain_deadline => {
            warn!(
                target: "devscribe::serve",
                grace_seconds = grace.as_secs(),
                "graceful shutdown timed out; dropping open connections"
            );
            Ok(())
        }
    }
}

fn build_http_state(settings: &config::Settings) -> Result<HttpState, AppError> {
    let repo: Arc<dyn ContentRepo> = Arc::new(SanityRepo::new(&settings.cms)?);
    let images: Arc<dyn AssetUrlResolver> = Arc::new(SanityImageUrls::new(
        settings.cms.project_id.clone(),
        settings.cms.dataset.clone(),
    ));

    if settings.cms.token.is_none() {
        warn!(
            target: "devscribe::serve",
            "no cms write token configured; comment submissions will fail"
        );
    }

    Ok(HttpState {
        posts: Arc::new(PostService::new(repo.clone(), images)),
        comments: Arc::new(CommentService::new(repo)),
        chrome: Arc::new(ChromeService::new(settings.site.clone())),
        cache: CacheState::new(&settings.cache),
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = %err, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => error!(error = %err, "failed to listen for SIGTERM"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!(target: "devscribe::serve", "shutdown signal received, draining connections");
}
