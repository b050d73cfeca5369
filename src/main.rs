use std::{str::FromStr, time::Duration};

use actix_web::{App, HttpServer, middleware::Compress, web};
use clap::{Command, arg, crate_authors, crate_description, crate_name, crate_version};
use config::{Config, File};
use fern::colors::{Color, ColoredLevelConfig};
use log::{LevelFilter, error, info};
use siteshelf::{
    StartupError,
    conf::ServerConfig,
    routes::{RoutingState, cors_policy, setup_service_config},
};

fn setup_logger(level: LevelFilter, log_file: Option<&String>) -> Result<(), fern::InitError> {
    let colors = ColoredLevelConfig::new()
        .info(Color::BrightGreen)
        .error(Color::BrightRed)
        .warn(Color::BrightYellow);

    let mut dispatch = fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{}] [{}] {}",
                colors.color(record.level()),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stdout());

    if let Some(path) = log_file {
        dispatch = dispatch.chain(fern::log_file(path)?);
    }

    dispatch.apply()?;
    Ok(())
}

fn load_config(path: Option<&String>) -> Result<ServerConfig, StartupError> {
    let mut settings_builder = Config::builder();

    if let Some(v) = path {
        settings_builder = settings_builder.add_source(File::with_name(v));
    }

    // Eg.. `SITE_GENERAL__PORT=9000 ./siteshelf` overrides `general.port`
    let settings = settings_builder
        .add_source(config::Environment::with_prefix("SITE").separator("__"))
        .build()?;

    Ok(settings.try_deserialize::<ServerConfig>()?)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let cmd = Command::new(crate_name!())
        .version(crate_version!())
        .author(crate_authors!(","))
        .about(crate_description!())
        .arg(arg!(-c --config <FILE> "Path to a config file").required(false))
        .arg(arg!(-l --log_level <LEVEL> "Sets the logging level").required(false))
        .arg(arg!(--log_file <FILE> "Also write logs to this file").required(false))
        .get_matches();

    let level = cmd
        .get_one::<String>("log_level")
        .and_then(|v| LevelFilter::from_str(v).ok())
        .unwrap_or(LevelFilter::Info);
    if let Err(e) = setup_logger(level, cmd.get_one::<String>("log_file")) {
        eprintln!("Failed to set up logging: {}", e);
    }

    let config = match load_config(cmd.get_one::<String>("config")) {
        Ok(v) => v,
        Err(e) => {
            error!("{}", e);
            return Err(std::io::Error::other(e));
        }
    };

    let state = match RoutingState::from_config(&config) {
        Ok(v) => web::Data::new(v),
        Err(e) => {
            error!("Refusing to start: {}", e);
            return Err(std::io::Error::other(e));
        }
    };

    info!(
        "Starting {} on {}:{} ({} assets fingerprinted)",
        config.general.name,
        config.general.bind,
        config.general.port,
        state.gate.index().len()
    );

    let timeout = Duration::from_secs(config.general.request_timeout);
    let app_config = config.clone();
    HttpServer::new(move || {
        let state = state.clone();
        App::new()
            .wrap(cors_policy(&app_config))
            .wrap(Compress::default())
            .configure(move |f| {
                setup_service_config(f, state);
            })
    })
    .client_request_timeout(timeout)
    .keep_alive(timeout)
    .bind((config.general.bind.as_str(), config.general.port))?
    .run()
    .await
}
