//! zhihu scraper CLI
//!
//! Fetches one entity and prints its fields and the first items of its
//! listings.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use zhihu::{
    Answer, Collection, Config, Question, Session, Topic, User,
    error::Result,
    services::Limit,
};

/// zhihu - personal scraping client for users, questions, answers,
/// topics and collections
#[derive(Parser, Debug)]
#[command(name = "zhihu", version, about = "Scrape zhihu.com pages")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "zhihu.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show a user profile and the first items of its lists
    User {
        /// Profile link, e.g. http://www.zhihu.com/people/zonyitoo
        url: String,

        /// Items to show per list, negative for all
        #[arg(short, long, default_value_t = 5, allow_negative_numbers = true)]
        limit: i64,
    },

    /// Show a question, its followers and top answers
    Question {
        url: String,

        #[arg(short, long, default_value_t = 5, allow_negative_numbers = true)]
        limit: i64,
    },

    /// Show an answer and its voters
    Answer {
        url: String,

        /// Write the answer body to this HTML file
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Show a collection, its followers, questions and answers
    Collection {
        url: String,

        #[arg(short, long, default_value_t = 5, allow_negative_numbers = true)]
        limit: i64,
    },

    /// Show a topic and its best answerers
    Topic { url: String },

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn list<T: std::fmt::Display>(title: &str, items: &[T]) {
    log::info!("{title} ({})", items.len());
    for (i, item) in items.iter().enumerate() {
        log::info!("  {:>3}. {item}", i + 1);
    }
}

fn show_user(session: &Session, url: &str, limit: Limit) -> Result<()> {
    let mut user = User::new(session, url, "")?;
    log::info!("{user}");
    log::info!("ID: {}", user.user_id());
    log::info!("Bio: {}", user.bio());
    log::info!("Location: {}", user.location());
    log::info!("Business: {}", user.business());
    log::info!("Gender: {}", user.gender());
    log::info!(
        "Followees {} / followers {} / agree {} / thanks {}",
        user.followees_num(),
        user.followers_num(),
        user.agree_num(),
        user.thanks_num()
    );
    log::info!(
        "Asks {} / answers {} / posts {} / collections {} / logs {}",
        user.asks_num(),
        user.answers_num(),
        user.posts_num(),
        user.collections_num(),
        user.logs_num()
    );

    list("Followers", &user.followers_n(limit));
    list("Followees", &user.followees_n(limit));
    list("Followed topics", &user.followed_topics_n(limit));
    list("Asks", &user.asks_n(limit));
    list("Answers", &user.answers_n(limit));
    list("Collections", &user.collections_n(limit));
    list("Likes", &user.likes_n(limit));
    Ok(())
}

fn show_question(session: &Session, url: &str, limit: Limit) -> Result<()> {
    let mut question = Question::new(session, url, "")?;
    log::info!("Title: {}", question.title());
    log::info!("Detail: {}", question.detail());
    log::info!(
        "Answers {} / followers {} / comments {} / visits {}",
        question.answers_num(),
        question.followers_num(),
        question.comments_num(),
        question.visit_times()
    );

    list("Topics", &question.topics());
    list("Followers", &question.followers_n(limit));
    list("Top answers", &question.top_answers(limit));
    Ok(())
}

fn show_answer(session: &Session, url: &str, export: Option<PathBuf>) -> Result<()> {
    let mut answer = Answer::new(session, url, None, None);
    if let Some(question) = answer.question() {
        log::info!("Question: {question}");
    }
    if let Some(author) = answer.author() {
        log::info!("Author: {author}");
    }
    log::info!(
        "Upvote {} / comments {} / collected {}",
        answer.upvote(),
        answer.comments_num(),
        answer.collected_num()
    );
    list("Voters", &answer.voters_n(Limit::AtMost(10)));

    if let Some(path) = export {
        let written = answer.export_html(path)?;
        log::info!("Answer saved to {}", written.display());
    }
    Ok(())
}

fn show_collection(session: &Session, url: &str, limit: Limit) -> Result<()> {
    let mut collection = Collection::new(session, url, "", None)?;
    log::info!("Name: {}", collection.name());
    if let Some(creator) = collection.creator() {
        log::info!("Creator: {creator}");
    }
    log::info!(
        "Followers {} / comments {} / questions {} / answers {}",
        collection.followers_num(),
        collection.comments_num(),
        collection.questions_num(),
        collection.answers_num()
    );

    list("Followers", &collection.followers_n(limit));
    list("Questions", &collection.questions_n(limit));
    list("Answers", &collection.answers_n(limit));
    Ok(())
}

fn show_topic(session: &Session, url: &str) -> Result<()> {
    let mut topic = Topic::new(session, url, "")?;
    log::info!("Name: {}", topic.name());
    log::info!("Description: {}", topic.description());
    log::info!("Followers: {}", topic.followers_num());

    let mut authors = topic.top_authors();
    log::info!("Top authors ({})", authors.len());
    for author in authors.iter_mut() {
        let bio = author.bio();
        log::info!("  {author} {bio}");
    }
    Ok(())
}

/// Main entry point for the CLI application.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load_or_default(&cli.config);
    log::info!("Loaded configuration from {}", cli.config.display());

    if let Command::Validate = cli.command {
        log::info!("Validating configuration...");
        if let Err(e) = config.validate() {
            log::error!("Config validation failed: {}", e);
            return Err(e);
        }
        log::info!("✓ Config OK");
        return Ok(());
    }

    config.validate()?;
    let session = Session::from_config(&config)?;

    match cli.command {
        Command::User { url, limit } => show_user(&session, &url, limit.into())?,
        Command::Question { url, limit } => show_question(&session, &url, limit.into())?,
        Command::Answer { url, export } => show_answer(&session, &url, export)?,
        Command::Collection { url, limit } => show_collection(&session, &url, limit.into())?,
        Command::Topic { url } => show_topic(&session, &url)?,
        Command::Validate => {}
    }

    log::info!("Done!");

    Ok(())
}
