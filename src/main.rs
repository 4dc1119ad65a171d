use anthropic_chat::utils::{logger, validation::Validate};
use anthropic_chat::{AnthropicClient, ChatError, ChatSession, CliArgs, LocalStorage, Repl};
use clap::Parser;

fn exit_with(error: &ChatError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        error,
        error.category(),
        error.severity()
    );
    eprintln!("❌ {}", error.user_friendly_message());
    eprintln!("💡 Suggestion: {}", error.recovery_suggestion());

    std::process::exit(error.severity().exit_code());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    if args.json_logs {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    let config = match args.resolve() {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };
    if args.verbose {
        tracing::debug!("Resolved config: {:?}", config);
    }
    if let Err(e) = config.validate() {
        exit_with(&e);
    }

    let client = match AnthropicClient::from_config(&config) {
        Ok(client) => client,
        Err(e) => exit_with(&e),
    };
    tracing::info!("Using model {} via {}", config.model, client.endpoint());

    let session = ChatSession::new(client, LocalStorage::current_dir(), config.clone());

    if let Some(message) = &args.message {
        let result = session.chat(message, &args.files).await;
        session.log_final_stats();
        match result {
            Ok(reply) => println!("{}", reply),
            Err(e) => exit_with(&e),
        }
        return Ok(());
    }

    let transcripts = LocalStorage::new(&config.transcript_dir);
    let mut repl = Repl::new(session, transcripts);
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    repl.run(stdin, &mut std::io::stdout()).await?;

    Ok(())
}
