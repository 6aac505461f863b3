use futures::executor::block_on;
use std::io::{self, Write};
use vault_terminal::logging::init_native_logger;
use vault_terminal::model::{OfflineModel, ThreadSleep};
use vault_terminal::{RouterConfig, Sentinel, Session, SessionController};

fn load_config() -> RouterConfig {
    match std::env::args().nth(1) {
        Some(path) => RouterConfig::from_file(&path).unwrap_or_else(|e| {
            log::warn!("could not load config from {}: {}, using defaults", path, e);
            RouterConfig::default()
        }),
        None => RouterConfig::default(),
    }
}

fn main() -> io::Result<()> {
    init_native_logger();
    let config = load_config();
    let mut controller = SessionController::new(config.clone(), OfflineModel::default(), ThreadSleep);
    let mut session = Session::new(config.greeting.clone());

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    println!("{}", config.greeting);
    loop {
        let cwd = controller.current_directory(session.history());
        print!("{}@{}:{}$ ", config.identity, config.hostname, cwd);
        stdout.flush()?;

        let mut input = String::new();
        if stdin.read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        let response = block_on(controller.handle_turn(session.request(input)));
        session.apply(input, &response);
        match response.sentinel() {
            Some(Sentinel::ClearScreen) => {
                print!("\x1b[2J\x1b[H");
                println!("{}", config.greeting);
            }
            Some(Sentinel::ExitSession) => break,
            None => {
                if !response.relevant_data.is_empty() {
                    println!("{}", response.relevant_data);
                }
            }
        }
    }
    Ok(())
}
