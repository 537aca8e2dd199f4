use anyhow::Result;
use clap::Parser;
use reinforge::{
    app,
    cli::{Cli, Command},
    logging,
};

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Train(args) => {
            logging::init(args.log.log, args.log.logfile_path().as_deref())?;
            let config = args.run_config()?;
            app::train(&config, args.tensorboard.as_deref())?;
        }
        Command::Eval(args) => {
            logging::init(args.log.log, args.log.logfile_path().as_deref())?;
            let config = args.run_config()?;
            let mean = app::eval(&config, &args.model, args.episodes)?;
            println!("mean total reward over {} episodes: {:.4}", args.episodes, mean);
        }
    }
    Ok(())
}
