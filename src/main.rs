mod elastic;
mod settings;

use std::process::ExitCode;

use clap::Parser;
use dotenvy::dotenv;
use indicatif::HumanDuration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::elastic::error::ElasticError;
use crate::elastic::index_facade::IndexFacade;
use crate::elastic::index_repository::IndexRepository;
use crate::elastic::template::TemplateOutcome;
use crate::settings::Settings;

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv_result = dotenv();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "es_reindex=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
    if let Err(err) = dotenv_result {
        if !err.not_found() {
            tracing::warn!("could not load .env: {}", err);
        }
    }

    let settings = Settings::parse();
    match run(&settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(settings: &Settings) -> Result<(), ElasticError> {
    settings.validate()?;
    let repository = IndexRepository::connect(
        settings.elastic_url.clone(),
        settings.username.as_deref(),
        settings.password.as_deref(),
    )?;

    let report = IndexFacade::new(&repository)
        .reindex_alias(&settings.reindex_request())
        .await?;

    match &report.secondary_alias {
        Some(secondary_alias) => println!(
            "new index {} created and {}, {} pointing to {} ({})",
            report.next,
            report.alias,
            secondary_alias,
            report.next,
            HumanDuration(report.elapsed)
        ),
        None => println!(
            "new index {} created and {} pointing to {} ({})",
            report.next,
            report.alias,
            report.next,
            HumanDuration(report.elapsed)
        ),
    }
    tracing::info!(stage = %report.stage, "done");
    match &report.template {
        TemplateOutcome::Published(name) => tracing::info!(template = name.as_str(), "template in place"),
        TemplateOutcome::Failed(err) => println!("warning: index template was not published: {}", err),
        TemplateOutcome::Skipped => {}
    }
    if let Some(err) = &report.close_error {
        println!("warning: old index {} is still open: {}", report.current, err);
    }
    Ok(())
}
