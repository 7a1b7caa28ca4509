use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use markscale::config;
use markscale::io;
use markscale::output;
use markscale::roster::{self, Exam, Roster, Student};
use markscale::scaling::{self, ScalingMethod};
use markscale::session::{self, Autosave};

const EXIT_SUCCESS: i32 = 0;
const EXIT_CONFIG: i32 = 1;
const EXIT_DATA: i32 = 2;
const EXIT_IO: i32 = 3;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a config file interactively
    Init,
    /// Show the raw/scaled/rounded marks for one exam
    List {
        /// Exam id to display
        exam_id: String,
    },
    /// List exam definitions and their applied scaling methods
    Exams,
    /// Define a new exam
    AddExam {
        /// Unique exam id (e.g. "midterm-2026")
        id: String,
        /// Display name
        name: String,
        /// Raw mark ceiling (must be positive)
        total_marks: f64,
        /// Target ceiling after scaling (must be positive)
        scaling_value: f64,
    },
    /// Add a student to the roster
    AddStudent {
        /// Unique student id
        id: String,
        /// Display name
        name: String,
    },
    /// Record a raw mark for a student
    SetMark {
        student_id: String,
        exam_id: String,
        /// Raw mark between 0 and the exam's total_marks
        mark: f64,
    },
    /// Scale an exam's raw marks with one of the four methods
    Scale {
        /// Exam id to scale
        exam_id: String,
        /// bell-curve, linear, min-max or percentile
        /// (falls back to default_method from config)
        #[arg(short, long)]
        method: Option<String>,
    },
    /// Round an exam's scaled marks to whole numbers
    Round {
        /// Exam id to round
        exam_id: String,
    },
    /// Import students and raw marks from wide-format CSV
    Import {
        /// CSV file: student_id,name,<exam-id>,...
        file: PathBuf,
    },
    /// Export one exam's marks as CSV or JSON
    Export {
        /// Exam id to export
        exam_id: String,
        /// Output format: csv or json
        #[arg(short, long, default_value = "csv")]
        format: String,
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Parser, Debug)]
#[command(name = "markscale")]
#[command(about = "Exam mark scaling for class rosters", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/markscale/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Path to roster file (overrides the config)
    #[arg(short, long, global = true)]
    roster: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

fn main() {
    let cli = Cli::parse();

    // Load config
    let config_path = cli.config.clone().map(PathBuf::from);
    let config = match config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Validate config at startup
    if let Err(errors) = config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    if let Commands::Init = cli.command {
        if let Err(e) = config::init::run_init_wizard(cli.config.map(PathBuf::from)) {
            eprintln!("Init failed: {}", e);
            std::process::exit(EXIT_IO);
        }
        std::process::exit(EXIT_SUCCESS);
    }

    // Resolve roster path: CLI flag > config > default
    let roster_path = cli
        .roster
        .clone()
        .or_else(|| config.roster.clone())
        .unwrap_or_else(config::get_default_roster_path);

    if cli.verbose {
        eprintln!("Roster file: {}", roster_path.display());
    }

    let mut roster = match load_roster_or_recover(&roster_path) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Failed to load roster: {:#}", e);
            std::process::exit(EXIT_DATA);
        }
    };

    if cli.verbose {
        eprintln!(
            "Loaded {} students, {} exams",
            roster.students.len(),
            roster.exams.len()
        );
    }

    let use_colors = config.colors.unwrap_or_else(output::should_use_colors);

    match cli.command {
        Commands::Init => unreachable!("handled above"),

        Commands::List { exam_id } => {
            let report = match io::exam_report(&roster, &exam_id) {
                Ok(r) => r,
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(EXIT_DATA);
                }
            };
            println!("{}", output::format_exam_table(&report, use_colors));
        }

        Commands::Exams => {
            println!("{}", output::format_exam_list(&roster.exams, use_colors));
        }

        Commands::AddExam {
            id,
            name,
            total_marks,
            scaling_value,
        } => {
            if total_marks <= 0.0 || !total_marks.is_finite() {
                eprintln!("total_marks must be a positive number (got {})", total_marks);
                std::process::exit(EXIT_DATA);
            }
            if scaling_value <= 0.0 || !scaling_value.is_finite() {
                eprintln!(
                    "scaling_value must be a positive number (got {})",
                    scaling_value
                );
                std::process::exit(EXIT_DATA);
            }
            let exam = Exam {
                id: id.clone(),
                name,
                total_marks,
                scaling_value,
                scaling_method: None,
            };
            if !roster.add_exam(exam) {
                eprintln!("An exam with id '{}' already exists", id);
                std::process::exit(EXIT_DATA);
            }
            persist(&roster_path, &mut roster);
            println!("Added exam '{}'", id);
        }

        Commands::AddStudent { id, name } => {
            if !roster.add_student(Student::new(id.clone(), name)) {
                eprintln!("A student with id '{}' already exists", id);
                std::process::exit(EXIT_DATA);
            }
            persist(&roster_path, &mut roster);
            println!("Added student '{}'", id);
        }

        Commands::SetMark {
            student_id,
            exam_id,
            mark,
        } => {
            let total_marks = match roster.exam(&exam_id) {
                Some(exam) => exam.total_marks,
                None => {
                    eprintln!("No exam with id '{}'", exam_id);
                    std::process::exit(EXIT_DATA);
                }
            };
            if !mark.is_finite() || mark < 0.0 || mark > total_marks {
                eprintln!("Mark must be between 0 and {} (got {})", total_marks, mark);
                std::process::exit(EXIT_DATA);
            }
            match roster.student_mut(&student_id) {
                Some(student) => student.set_raw_mark(exam_id.clone(), mark),
                None => {
                    eprintln!(
                        "No student with id '{}'. Add one with 'markscale add-student'.",
                        student_id
                    );
                    std::process::exit(EXIT_DATA);
                }
            }
            persist(&roster_path, &mut roster);
            println!("Recorded {} for {} on '{}'", mark, student_id, exam_id);
        }

        Commands::Scale { exam_id, method } => {
            let method = match resolve_method(method.as_deref(), &config) {
                Ok(m) => m,
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(EXIT_CONFIG);
                }
            };
            let exam = match roster.exam(&exam_id) {
                Some(exam) => exam.clone(),
                None => {
                    eprintln!("No exam with id '{}'", exam_id);
                    std::process::exit(EXIT_DATA);
                }
            };

            let cohort = roster.cohort_size(&exam_id);
            if cohort == 0 {
                println!(
                    "No students hold a raw mark for exam '{}'; roster unchanged.",
                    exam_id
                );
                std::process::exit(EXIT_SUCCESS);
            }

            let updated = match scaling::apply(&roster.students, &exam, method) {
                Ok(students) => students,
                Err(e) => {
                    eprintln!("Scaling failed: {}", e);
                    std::process::exit(EXIT_DATA);
                }
            };
            roster.students = updated;
            // The engine leaves bookkeeping to the caller
            if let Some(exam) = roster.exam_mut(&exam_id) {
                exam.scaling_method = Some(method);
            }
            persist(&roster_path, &mut roster);
            println!(
                "Scaled {} of {} students for exam '{}' ({})",
                cohort,
                roster.students.len(),
                exam_id,
                method
            );
        }

        Commands::Round { exam_id } => {
            if roster.exam(&exam_id).is_none() {
                eprintln!("No exam with id '{}'", exam_id);
                std::process::exit(EXIT_DATA);
            }
            let updated = match scaling::round(&roster.students, &exam_id) {
                Ok(students) => students,
                Err(e) => {
                    eprintln!("Rounding failed: {}", e);
                    std::process::exit(EXIT_DATA);
                }
            };
            let rounded = updated
                .iter()
                .filter(|s| s.rounded_mark(&exam_id).is_some())
                .count();
            roster.students = updated;
            if rounded == 0 {
                println!(
                    "No scaled marks to round for exam '{}'. Run 'markscale scale' first.",
                    exam_id
                );
                std::process::exit(EXIT_SUCCESS);
            }
            persist(&roster_path, &mut roster);
            println!("Rounded {} marks for exam '{}'", rounded, exam_id);
        }

        Commands::Import { file } => {
            let summary = match io::import_marks_from_path(&mut roster, &file) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(EXIT_DATA);
                }
            };
            persist(&roster_path, &mut roster);
            println!(
                "Imported {} marks ({} students added, {} updated)",
                summary.marks_set, summary.students_added, summary.students_updated
            );
        }

        Commands::Export {
            exam_id,
            format,
            output,
        } => {
            let report = match io::exam_report(&roster, &exam_id) {
                Ok(r) => r,
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(EXIT_DATA);
                }
            };
            let result = match (format.as_str(), &output) {
                ("csv", Some(path)) => open_output(path)
                    .and_then(|file| io::write_exam_csv(&report, file)),
                ("csv", None) => io::write_exam_csv(&report, std::io::stdout().lock()),
                ("json", Some(path)) => open_output(path)
                    .and_then(|file| io::write_json(&report, file)),
                ("json", None) => io::write_json(&report, std::io::stdout().lock()),
                (other, _) => {
                    eprintln!("Unknown export format '{}'. Use csv or json.", other);
                    std::process::exit(EXIT_CONFIG);
                }
            };
            if let Err(e) = result {
                eprintln!("Export failed: {:#}", e);
                std::process::exit(EXIT_IO);
            }
            if let Some(path) = output {
                println!("Exported exam '{}' to {}", exam_id, path.display());
            }
        }
    }

    std::process::exit(EXIT_SUCCESS);
}

/// Pick the scaling method from the CLI flag, falling back to the config's
/// default_method
fn resolve_method(flag: Option<&str>, config: &config::Config) -> anyhow::Result<ScalingMethod> {
    match flag {
        Some(s) => ScalingMethod::parse(s),
        None => config.default_method().ok_or_else(|| {
            anyhow::anyhow!(
                "No scaling method given. Pass --method or set default_method in the config."
            )
        }),
    }
}

/// Load the roster, offering recovery from the autosave mirror when the
/// primary file is corrupt
fn load_roster_or_recover(path: &Path) -> anyhow::Result<Roster> {
    match roster::load_roster(path) {
        Ok(roster) => Ok(roster),
        Err(load_err) => {
            let autosave_path = session::autosave_path(path);
            let autosave = session::load_autosave(&autosave_path)?;
            match autosave {
                Some(autosave) => {
                    eprintln!("Failed to load roster: {:#}", load_err);
                    let recover = config::init::prompt_yes_no(
                        &format!(
                            "Recover from autosave at {} ({})?",
                            autosave_path.display(),
                            autosave.age_label()
                        ),
                        true,
                    )?;
                    if recover {
                        Ok(autosave.roster)
                    } else {
                        Err(load_err)
                    }
                }
                None => Err(load_err),
            }
        }
    }
}

fn open_output(path: &Path) -> anyhow::Result<std::fs::File> {
    use anyhow::Context;
    std::fs::File::create(path)
        .with_context(|| format!("Failed to create output file at {}", path.display()))
}

/// Save the roster and mirror it to the autosave file. Exits the process
/// on failure so no command reports success without a durable roster.
fn persist(path: &Path, roster: &mut Roster) {
    roster.saved_at = chrono::Utc::now();
    if let Err(e) = roster::save_roster(path, roster) {
        eprintln!("Failed to save roster: {:#}", e);
        std::process::exit(EXIT_IO);
    }
    let autosave = Autosave::new(roster.clone());
    if let Err(e) = session::save_autosave(&session::autosave_path(path), &autosave) {
        eprintln!("Warning: failed to write autosave: {:#}", e);
    }
}
