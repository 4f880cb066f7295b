use assockit::relayout::{self, Invocation};
use assockit::{init_logging, BUILD_DATE, VERSION};

fn main() -> anyhow::Result<()> {
    let argv: Vec<String> = std::env::args().collect();
    let args = match relayout::parse_args(&argv) {
        Ok(Invocation::Relayout(args)) => args,
        Ok(Invocation::Help) => {
            println!("{}", relayout::usage());
            return Ok(());
        }
        Ok(Invocation::Version) => {
            println!("assockit {} (built {})", VERSION, BUILD_DATE);
            return Ok(());
        }
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(2);
        }
    };

    let mut config = relayout::load_config(&args)?;

    // Initialize logging
    init_logging(&config.logging.level)?;

    let report = relayout::run(&args, &mut config)?;
    relayout::remember(&args, &config);

    println!(
        "{}: {} shape(s), {} connector(s) relaid out",
        report.output.display(),
        report.shapes,
        report.connectors
    );

    Ok(())
}
