use std::error::Error;

use clap::{command, Parser, Subcommand};
use eframe::{egui::ViewportBuilder, run_native};
use remind::{
    config::Config,
    notifier,
    reminder::format_hour,
    scheduler::Scheduler,
    store::ReminderStore,
    App,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// write a fresh default config and create the sounds directory
    Init {
        #[clap(long, short)]
        force: bool,
    },
    /// print the saved reminders without starting the gui
    List,
}

fn main() -> Result<(), Box<dyn Error>> {
    // initialize the logger
    simple_file_logger::init_logger!("remind").expect("couldn't initialize logger");

    let args = Args::parse();
    match args.command {
        Some(Command::Init { force }) => {
            if force || !Config::is_config_present() {
                Config::new().save(&Config::config_path())?;
                std::fs::create_dir_all(Config::sounds_path())?;
            }
            return Ok(());
        }
        Some(Command::List) => {
            let config = Config::load(&Config::config_path());
            for reminder in &config.reminders {
                println!(
                    "{} {} ({}) [{}] {}",
                    reminder.id,
                    format_hour(reminder.target_hour, config.use_24_hour),
                    if reminder.strict { "exact" } else { "±15 min" },
                    reminder.sound,
                    reminder.message,
                );
            }
            return Ok(());
        }
        None => {}
    }

    // the notifier thread holds the pending triggers and plays the sounds
    let (host, fired) = notifier::spawn();
    let store = ReminderStore::load(Config::config_path(), Scheduler::new(Box::new(host)));

    // make app transparent
    let native_options = eframe::NativeOptions {
        viewport: ViewportBuilder {
            transparent: Some(true),
            ..Default::default()
        },
        ..Default::default()
    };
    run_native(
        "ReMind",
        native_options,
        Box::new(move |cc| Ok(Box::new(App::new(cc, store, fired)))),
    )
    .map_err(Into::into)
}
