pub mod check;
pub mod serve;

use marquee_engine::{GalleryError, MarqueeConfig};

use crate::config::ConfigArgs;
use crate::connector::SchemeConnector;

/// Load the config file, apply CLI overrides and reject targets whose
/// scheme no plugin handles.
pub(crate) fn load_config(args: &ConfigArgs) -> Result<MarqueeConfig, GalleryError> {
    let mut config = MarqueeConfig::load(&args.config)?;
    if let Some(port) = args.port {
        config.api_port = port;
    }

    for target in config.resolve_targets()? {
        if !SchemeConnector::supports(target.scheme()) {
            return Err(GalleryError::Config(format!(
                "target '{}': unsupported uri scheme '{}'",
                target.name,
                target.scheme()
            )));
        }
    }
    Ok(config)
}
