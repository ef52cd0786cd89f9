use pingora_core::server::configuration::Opt;
use pingora_core::server::Server;

use pingcalc::config::Config;
use pingcalc::core::status;
use pingcalc::logging::FileLogger;
use pingcalc::service::{http::FunctionHttpApp, status::StatusHttpApp};

fn main() {
    // Read command-line arguments
    let opt = Opt::parse_args();

    let config = match Config::load_yaml_with_opt_override(&opt) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };

    // Initialize logging
    let logger = if let Some(log_cfg) = &config.log {
        let logger = FileLogger::new(log_cfg.clone());
        logger.init_env_logger();
        Some(logger)
    } else {
        env_logger::init();
        None
    };

    log::info!("Loading functions...");
    let function_service = match FunctionHttpApp::function_http_service(&config) {
        Ok(service) => service,
        Err(e) => {
            log::error!("Failed to initialize function service: {e}");
            std::process::exit(1);
        }
    };

    let mut pingcalc_server = Server::new_with_opt_and_conf(Some(opt), config.pingora);

    if let Some(log_service) = logger {
        log::info!("Adding log sync service...");
        pingcalc_server.add_service(log_service);
    }

    if let Some(status_cfg) = &config.status {
        log::info!("Adding status service on {}...", status_cfg.address);
        pingcalc_server.add_service(StatusHttpApp::status_http_service(status_cfg));
    }

    log::info!("Bootstrapping...");
    pingcalc_server.bootstrap();

    log::info!("Bootstrapped. Adding Services...");
    pingcalc_server.add_service(function_service);
    status::mark_ready(config.functions.len());

    log::info!("Starting Server...");
    pingcalc_server.run_forever();
}
