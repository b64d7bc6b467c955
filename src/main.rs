use clap::Parser;
use fmea::cli::{commands, Cli, Commands};
use miette::Result;

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) so piping into
    // `head` or `grep -q` does not panic on a broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    fmea::cli::setup_logging(global.verbose);

    match cli.command {
        Commands::Init(args) => commands::init::run(args),
        Commands::Doc(cmd) => commands::doc::run(cmd, &global),
        Commands::Structure(cmd) => commands::structure::run(cmd, &global),
        Commands::Function(cmd) => commands::function::run(cmd, &global),
        Commands::Fault(cmd) => commands::fault::run(cmd, &global),
        Commands::Team(cmd) => commands::team::run(cmd, &global),
        Commands::Tree(args) => commands::tree::run_tree(args, &global),
        Commands::Graph(args) => commands::tree::run_graph(args, &global),
        Commands::Validate(args) => commands::validate::run(args, &global),
        Commands::Import(args) => commands::exchange::run_import(args, &global),
        Commands::Export(args) => commands::exchange::run_export(args, &global),
        Commands::Completions(args) => commands::completions::run(args),
    }
}
