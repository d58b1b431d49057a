use clap::Parser;
use roof_report::{case, cli, config, error, export, intake, logging, review};
use cli::{Cli, Commands};
use config::Config;
use error::Result;
use roof_report_common::questionnaire::build_questionnaire;
use roof_report_common::report::{render_preview_html, Document};
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Intake { folder, section, case: case_path, no_resize } => {
            println!("📸 roof-report - intake\n");
            let case_path = case_path.unwrap_or_else(|| folder.join("case.json"));
            let mut case_file = case::load_or_default(&case_path)?;

            println!("[1/2] Processing photos for \"{}\"...", section);
            let summary = intake::intake_folder(&mut case_file, &folder, &section, !no_resize)?;
            println!("✔ {} photos added", summary.added);
            if summary.fallbacks > 0 {
                println!("  {} kept at original size (processing failed)", summary.fallbacks);
            }

            println!("[2/2] Saving case file...");
            case::save(&case_file, &case_path)?;
            println!("✔ Saved: {}", case_path.display());
        }

        Commands::Review { case: case_path } => {
            println!("📝 roof-report - review\n");
            let mut case_file = case::load(&case_path)?;
            let approved = review::run_interactive_review(&mut case_file)?;
            case::save(&case_file, &case_path)?;
            println!("\n✔ {} approved, saved: {}", approved, case_path.display());
        }

        Commands::Questionnaire { case: case_path } => {
            let case_file = case::load(&case_path)?;
            let questionnaire = build_questionnaire(&case_file.photos);
            println!("{}", serde_json::to_string_pretty(&questionnaire)?);
        }

        Commands::Preview { case: case_path, output } => {
            let mut case_file = case::load(&case_path)?;
            case::resolve_image_paths(&mut case_file, &case::base_dir(&case_path));
            config.apply_defaults(&mut case_file.metadata);

            let questionnaire = build_questionnaire(&case_file.photos);
            let html = render_preview_html(
                &case_file.photos,
                &questionnaire,
                &case_file.metadata.summary,
                &case_file.metadata.resolved_date(),
            );
            let output = output.unwrap_or_else(|| case::base_dir(&case_path).join("preview.html"));
            export::html::write_html(&html, &output)?;
            println!("✔ Preview: {}", output.display());
        }

        Commands::Export {
            case: case_path,
            format,
            output,
            photos_per_page,
            no_annotations,
            role,
            open,
        } => {
            println!("📄 roof-report - export\n");

            println!("[1/3] Loading case file...");
            let mut case_file = case::load(&case_path)?;
            case::resolve_image_paths(&mut case_file, &case::base_dir(&case_path));
            config.apply_defaults(&mut case_file.metadata);
            if let Some(role) = role {
                case_file.metadata.role = role;
            }
            println!("✔ {} photos\n", case_file.photos.len());

            println!("[2/3] Assembling report...");
            let questionnaire = build_questionnaire(&case_file.photos);
            let include_annotations = config.include_annotations && !no_annotations;
            let document = Document::build(
                &case_file.photos,
                &questionnaire,
                &case_file.metadata,
                case_file.signature.as_deref(),
                include_annotations,
            );
            let adapter = export::ExportAdapter::new(document);
            println!("✔ {} sections\n", adapter.document().sections.len());

            println!("[3/3] Exporting...");
            let output_dir = output.unwrap_or_else(|| case::base_dir(&case_path));
            let stem = case_path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| "report".to_string());
            let per_page = photos_per_page.unwrap_or(config.photos_per_page);

            let written = match adapter.export(format, &output_dir, &stem, per_page).await {
                Ok(paths) => paths,
                Err(e) => {
                    tracing::error!(error = %e, "export failed");
                    eprintln!("✖ Export failed: {}", e);
                    eprintln!("  Nothing was retried. Run the export again once the problem is fixed.");
                    return Err(e);
                }
            };

            if open {
                if let Some(path) = written.last() {
                    if let Err(e) = export::open_file(path).await {
                        eprintln!("✖ {}", e);
                    }
                }
            }

            println!("\n✅ Export complete");
        }

        Commands::Config { set_inspector, set_role, set_disclaimer, show } => {
            let mut config = config;
            let changed = set_inspector.is_some() || set_role.is_some() || set_disclaimer.is_some();

            if let Some(name) = set_inspector {
                config.inspector_name = Some(name);
            }
            if let Some(role) = set_role {
                config.role = role;
            }
            if let Some(disclaimer) = set_disclaimer {
                config.disclaimer = Some(disclaimer);
            }
            if changed {
                config.save()?;
                println!("✔ Configuration saved");
            }

            if show || !changed {
                let path = Config::config_path().unwrap_or_else(|_| PathBuf::from("?"));
                println!("Configuration ({}):", path.display());
                println!("  Inspector: {}", config.inspector_name().unwrap_or_else(|| "(not set)".into()));
                println!("  Role: {}", config.role);
                println!("  Disclaimer: {}", config.disclaimer.as_deref().unwrap_or("(default)"));
                println!("  Report title: {}", config.report_title.as_deref().unwrap_or("(default)"));
                println!("  Photos per page: {}", config.photos_per_page);
                println!("  Include annotations: {}", config.include_annotations);
            }
        }
    }

    Ok(())
}
