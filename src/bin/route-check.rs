use clap::Parser;
use webhook_relay::config::schema::DEFAULT_ROUTES_ENV;
use webhook_relay::routing::RouteTable;

#[derive(Parser)]
#[command(name = "route-check")]
#[command(about = "Inspect a webhook route table and resolve paths against it", long_about = None)]
struct Cli {
    /// JSON route object (defaults to the WEBHOOK_ROUTES environment variable).
    #[arg(short, long, env = DEFAULT_ROUTES_ENV)]
    routes: String,

    /// Request paths to resolve. Lists the whole table when empty.
    paths: Vec<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let table = RouteTable::from_json(&cli.routes)?;

    if cli.paths.is_empty() {
        println!("{} route(s)", table.len());
        for (key, target) in table.entries() {
            println!("/{key} -> {target}");
        }
        return Ok(());
    }

    let mut unresolved = 0;
    for path in &cli.paths {
        match table.lookup(path) {
            Some(target) => println!("{path} -> {target}"),
            None => {
                println!("{path} -> (no route, 404)");
                unresolved += 1;
            }
        }
    }

    if unresolved > 0 {
        eprintln!("{unresolved} path(s) did not resolve");
        std::process::exit(1);
    }
    Ok(())
}
