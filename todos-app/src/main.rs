use app::{AppError, AppProperties, AppResult};
use dotenv::dotenv;
use error_stack::ResultExt;
use error_stack::fmt::ColorMode;
use mapper::TodoQueryMapper;
use model::Todo;
use norm_core::{NotFoundExt, Repository};
use repositories::memory::MemoryRepository;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};
use uuid::Uuid;

mod app;
mod mapper;
mod model;

type TodoRepo = MemoryRepository<Todo, TodoQueryMapper>;

#[tokio::main]
async fn main() {
    match try_main().await {
        Ok(_) => info!("todos app shutting down"),
        Err(e) => {
            error!("todos app exited with error: {e:?}");
        }
    }
}

fn init_logging() {
    error_stack::Report::set_color_mode(ColorMode::None);

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_env("TODOS_LOG").unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

async fn try_main() -> AppResult<()> {
    // .env may set TODOS_LOG, so it is loaded before logging is up
    let env_file = dotenv();
    init_logging();

    if let Err(e) = env_file {
        warn!("failed to load .env file: {e}");
    }

    let properties = AppProperties::from_env()?;
    let repo = TodoRepo::with_uuids();

    seed(&repo, properties.seed).await?;
    tour(&repo).await
}

#[instrument(skip(repo))]
async fn seed(repo: &TodoRepo, count: usize) -> AppResult<()> {
    for n in 1..=count {
        let mut todo = Todo::new(format!("todo #{n}"));
        if n % 2 == 0 {
            todo.close();
        }
        if n % 3 == 0 {
            todo = todo.tagged("chore");
        }
        repo.save(todo).await.change_context(AppError)?;
    }

    debug!("seeded {count} todos");
    Ok(())
}

/// Walks through every repository operation against the seeded store.
#[instrument(skip(repo))]
async fn tour(repo: &TodoRepo) -> AppResult<()> {
    let closed = repo
        .find(|q| q.closed_tasks())
        .await
        .change_context(AppError)?;
    info!("{} closed todos", closed.len());
    for todo in &closed {
        info!("closed: {}", todo.title);
    }

    let open_chores = repo
        .find(|q| {
            q.open_tasks();
            q.tagged("chore");
        })
        .await
        .change_context(AppError)?;
    info!("{} open chores", open_chores.len());

    if let Some(mut todo) = open_chores.into_iter().next() {
        todo.close();
        let todo = repo.update(todo).await.change_context(AppError)?;
        info!("closed {}", todo.title);
    }

    for todo in repo
        .find(|q| q.closed_tasks())
        .await
        .change_context(AppError)?
    {
        if let Some(id) = todo.id {
            repo.delete(id).await.change_context(AppError)?;
        }
    }

    let remaining = repo.find_all().await.change_context(AppError)?;
    info!("{} todos left after clearing closed ones", remaining.len());

    let fifth = repo
        .find(|q| q.title_contains("#5"))
        .await
        .change_context(AppError)?;
    info!("{} todos mention #5", fifth.len());

    let missing = repo.find_by_id(Uuid::now_v7()).await;
    if missing.is_not_found() {
        info!("looking up an unknown id reports not found");
    } else {
        missing.change_context(AppError)?;
    }

    Ok(())
}
