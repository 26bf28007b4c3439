use marquee_engine::TargetPool;

use crate::cmd::load_config;
use crate::config::ConfigArgs;
use crate::error::ServerError;

pub fn run(args: ConfigArgs) -> Result<(), ServerError> {
    let config = load_config(&args)?;
    let pool = TargetPool::new(config.resolve_targets()?);

    println!("config ok: {}", args.config);
    println!("listen: {}:{}", config.bind_address, config.api_port);
    println!("{:<8} {:<16} {:>8}  uri", "priority", "name", "capacity");
    for t in pool.iter() {
        println!("{:<8} {:<16} {:>8}  {}", t.priority, t.name, t.capacity, t.redacted_uri());
    }
    println!("total capacity: {}", pool.total_capacity());
    Ok(())
}
