use fpga_io::{OrchestratorConfig, counter, open_window};

fn usage() -> ! {
    eprintln!(
        "Usage: counter <config.toml>\n\
         \n\
         Examples:\n\
           cargo run --bin counter -- config/counter_sim.toml\n\
           sudo ./counter config/counter_devmem.toml\n\
         \n\
         Keys: KEY0 +1, KEY1 -1, KEY2 reset, KEY3 quit.\n\
         Set RUST_LOG=debug to trace register writes."
    );
    std::process::exit(2)
}

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let config_path = args.next().unwrap_or_else(|| usage());
    if args.next().is_some() {
        usage();
    }

    let config = match OrchestratorConfig::from_file(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("failed to load config: {e}");
            std::process::exit(1);
        }
    };
    let mut window = match open_window(&config) {
        Ok(window) => window,
        Err(e) => {
            eprintln!("failed to open register window: {e}");
            std::process::exit(1);
        }
    };

    let result = counter::run(&mut window, &config.runtime);
    if let Err(e) = window.close() {
        eprintln!("failed to close register window: {e}");
    }
    match result {
        Ok(value) => println!("Final count: {value}"),
        Err(e) => {
            eprintln!("counter stopped: {e}");
            std::process::exit(1);
        }
    }
}
