use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;
use projex_cli::accounts::create_verified_user;
use projex_cli::seeder::{self, SeedConfig};
use sqlx::postgres::{PgPool, PgPoolOptions};

#[derive(Parser)]
#[command(name = "projex-cli")]
#[command(about = "ProjeX CLI - Administrative tools for ProjeX", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a user whose email is already verified
    CreateUser {
        /// Email address
        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Username (3-13 lowercase letters, digits or underscores)
        #[arg(short = 'u', long)]
        username: Option<String>,

        /// Full name
        #[arg(short = 'n', long)]
        full_name: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Seed the database with fake users, projects, members, tasks, subtasks and notes
    Seed {
        /// Number of users to create
        #[arg(short = 'u', long, default_value = "20")]
        users: usize,

        /// Number of projects to create
        #[arg(short = 'p', long, default_value = "5")]
        projects: usize,

        /// Members per project, admin included
        #[arg(long, default_value = "4")]
        members: usize,

        /// Tasks per project
        #[arg(long, default_value = "10")]
        tasks: usize,

        /// Subtasks per task
        #[arg(long, default_value = "3")]
        subtasks: usize,

        /// Notes per project
        #[arg(long, default_value = "3")]
        notes: usize,
    },
    /// Clear all seeded data (users with an @seed.projex.dev email and what they own)
    ClearSeed,
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to database");

    let cli = Cli::parse();

    match cli.command {
        Commands::CreateUser {
            email,
            username,
            full_name,
            password,
        } => handle_create_user(&pool, email, username, full_name, password).await,
        Commands::Seed {
            users,
            projects,
            members,
            tasks,
            subtasks,
            notes,
        } => {
            let config = SeedConfig {
                users,
                projects,
                members_per_project: members,
                tasks_per_project: tasks,
                subtasks_per_task: subtasks,
                notes_per_project: notes,
            };
            handle_seed(&pool, config).await
        }
        Commands::ClearSeed => handle_clear_seed(&pool).await,
    }
}

fn prompt(value: Option<String>, label: &str) -> String {
    value.unwrap_or_else(|| {
        Input::new()
            .with_prompt(label)
            .interact_text()
            .unwrap_or_else(|e| fail(&format!("Failed to read {}: {}", label.to_lowercase(), e)))
    })
}

fn fail(message: &str) -> ! {
    eprintln!("\n❌ {}", message);
    std::process::exit(1);
}

async fn handle_create_user(
    pool: &PgPool,
    email: Option<String>,
    username: Option<String>,
    full_name: Option<String>,
    password: Option<String>,
) {
    let email = prompt(email, "Email address");
    let username = prompt(username, "Username");
    let full_name = prompt(full_name, "Full name");

    let password = password.unwrap_or_else(|| {
        Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()
            .unwrap_or_else(|e| fail(&format!("Failed to read password: {}", e)))
    });

    match create_verified_user(pool, &email, &username, &full_name, &password).await {
        Ok(id) => {
            println!("\n✅ User created successfully!");
            println!("   ID: {}", id);
            println!("   Email: {}", email.to_lowercase());
            println!("   Username: {}", username);
        }
        Err(e) => fail(&format!("Error creating user: {}", e)),
    }
}

async fn handle_seed(pool: &PgPool, config: SeedConfig) {
    if let Err(e) = seeder::seed_all(pool, config).await {
        fail(&format!("Error seeding database: {}", e));
    }
}

async fn handle_clear_seed(pool: &PgPool) {
    if let Err(e) = seeder::clear_all(pool).await {
        fail(&format!("Error clearing seeded data: {}", e));
    }
}
