use clap::{Parser, Subcommand};

mod grader;
mod models;
mod report;
mod session;
mod store;

#[derive(Parser)]
#[command(name = "quiz-grade-sync")]
#[command(about = "Objective-question grading entry synced to a Feishu Bitable table", long_about = None)]
struct Cli {
    /// Access password, checked against APP_PASSWORD
    #[arg(long)]
    password: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade one answer sheet and sync the result to the table
    Grade {
        /// Student name
        #[arg(long)]
        name: String,
        /// Homework title
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        choice_student: String,
        #[arg(long, default_value = "")]
        choice_key: String,
        #[arg(long, default_value = "")]
        cloze_student: String,
        #[arg(long, default_value = "")]
        cloze_key: String,
        #[arg(long, default_value = "")]
        reading_student: String,
        #[arg(long, default_value = "")]
        reading_key: String,
    },
    /// Look up graded records by student name
    History {
        /// Student name to look up; repeat for several students
        #[arg(long, required = true)]
        name: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let session = session::login(&cli.password, &session::configured_password());
    if !session.authenticated {
        anyhow::bail!("密码错误");
    }

    let client = store::StoreClient::new(store::StoreConfig::from_env());

    match cli.command {
        Commands::Grade {
            name,
            title,
            choice_student,
            choice_key,
            cloze_student,
            cloze_key,
            reading_student,
            reading_key,
        } => {
            if name.trim().is_empty() || title.trim().is_empty() {
                anyhow::bail!("请填入姓名和标题");
            }

            let inputs = [
                (models::SECTIONS[0], &choice_student, &choice_key),
                (models::SECTIONS[1], &cloze_student, &cloze_key),
                (models::SECTIONS[2], &reading_student, &reading_key),
            ];
            let mut results = Vec::new();
            for (section, student, key) in inputs {
                if let Some(result) = grader::compare(student, key, section) {
                    results.push(result);
                }
            }

            if results.is_empty() {
                println!("所有题型的标准答案均为空，未生成批改记录。");
                return Ok(());
            }

            let record = report::build_record(&name, &title, &results);
            client.submit(&record).await?;
            println!("✅ 同步成功！");
            println!();
            print!("{}", report::render_confirmation(&record, &results));
        }
        Commands::History { name } => {
            let rows = client.query(&name).await?;
            if rows.is_empty() {
                println!("未查询到记录");
            } else {
                print!("{}", report::render_history(&rows));
            }
        }
    }

    Ok(())
}
