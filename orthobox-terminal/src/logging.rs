/// Logger setup for the terminal front end
use std::fs::File;
use std::path::PathBuf;
use std::sync::Once;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info",
/// "orthobox_core=debug"). The terminal surface owns stdout, so records go to
/// `file` when one is given and to stderr otherwise.
#[derive(Debug, Clone, Default)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub file: Option<PathBuf>,
}

static INIT: Once = Once::new();

/// Initializes the global logger once; later calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        if let Some(filter) = config.env_filter {
            builder.parse_filters(&filter);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        } else {
            builder.filter_level(log::LevelFilter::Info);
        }

        match config.file.as_ref().map(|path| (path, File::create(path))) {
            Some((_, Ok(file))) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
                builder.write_style(env_logger::WriteStyle::Never);
            }
            Some((path, Err(err))) => {
                let path = path.display();
                eprintln!("cannot open log file {path}: {err}; logging to stderr");
            }
            None => {}
        }

        builder.init();

        log::debug!("logging initialized");
    });
}
