use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;
use mesrs_cli::seeder::{self, SeedConfig};
use sqlx::postgres::{PgPool, PgPoolOptions};

#[derive(Parser)]
#[command(name = "mesrs-cli")]
#[command(about = "MESRS CLI - administration tools for the ministry dashboard", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an administrator account
    CreateAdmin {
        /// First name of the administrator
        #[arg(short = 'f', long)]
        first_name: Option<String>,

        /// Last name of the administrator
        #[arg(short = 'l', long)]
        last_name: Option<String>,

        /// Email address
        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Seed universities, formations, people, exams and scholarships
    Seed {
        /// Number of universities to create
        #[arg(short = 'u', long, default_value = "5")]
        universities: usize,

        /// Number of formations per university
        #[arg(long, default_value = "4")]
        formations: usize,

        /// Number of courses per formation
        #[arg(long, default_value = "4")]
        courses: usize,

        /// Number of teachers per university
        #[arg(long, default_value = "6")]
        teachers: usize,

        /// Number of students per formation
        #[arg(long, default_value = "20")]
        students: usize,

        /// Number of ministry staff accounts
        #[arg(long, default_value = "3")]
        staff: usize,

        /// Number of scholarships
        #[arg(long, default_value = "4")]
        scholarships: usize,
    },
    /// Clear all seeded data (keeps administrators and academic years)
    Clear,
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("❌ DATABASE_URL must be set");
        std::process::exit(1);
    };

    let pool = match PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("❌ Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    let cli = Cli::parse();

    match cli.command {
        Commands::CreateAdmin {
            first_name,
            last_name,
            email,
            password,
        } => handle_create_admin(&pool, first_name, last_name, email, password).await,
        Commands::Seed {
            universities,
            formations,
            courses,
            teachers,
            students,
            staff,
            scholarships,
        } => {
            let config = SeedConfig::new(universities)
                .with_formations(formations, courses)
                .with_teachers(teachers)
                .with_students(students)
                .with_staff(staff)
                .with_scholarships(scholarships);
            handle_seed(&pool, config).await
        }
        Commands::Clear => handle_clear(&pool).await,
    }
}

fn prompt(label: &str) -> String {
    match Input::<String>::new().with_prompt(label).interact_text() {
        Ok(value) => value,
        Err(e) => {
            eprintln!("❌ Failed to read {}: {}", label.to_lowercase(), e);
            std::process::exit(1);
        }
    }
}

async fn handle_create_admin(
    pool: &PgPool,
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    password: Option<String>,
) {
    let first_name = first_name.unwrap_or_else(|| prompt("First name"));
    let last_name = last_name.unwrap_or_else(|| prompt("Last name"));
    let email = email.unwrap_or_else(|| prompt("Email address"));
    let password = password.unwrap_or_else(|| {
        match Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()
        {
            Ok(value) => value,
            Err(e) => {
                eprintln!("❌ Failed to read password: {}", e);
                std::process::exit(1);
            }
        }
    });

    if password.len() < 8 {
        eprintln!("\n❌ Password must be at least 8 characters");
        std::process::exit(1);
    }

    match seeder::create_admin(pool, &first_name, &last_name, &email, &password).await {
        Ok(id) => {
            println!("\n✅ Administrator created successfully!");
            println!("   Id: {}", id);
            println!("   Email: {}", email);
            println!("   Name: {} {}", first_name, last_name);
        }
        Err(e) => {
            eprintln!("\n❌ Error creating administrator: {}", e);
            std::process::exit(1);
        }
    }
}

async fn handle_seed(pool: &PgPool, config: SeedConfig) {
    if let Err(e) = seeder::seed_all(pool, config).await {
        eprintln!("\n❌ Error seeding database: {}", e);
        std::process::exit(1);
    }
}

async fn handle_clear(pool: &PgPool) {
    if let Err(e) = seeder::clear_all(pool).await {
        eprintln!("\n❌ Error clearing seeded data: {}", e);
        std::process::exit(1);
    }
}
