//! Command execution

use crate::cli::commands::Commands;
use crate::config::LytafConfig;
use crate::core::temporal::TimeRange;
use crate::core::vocabulary::translate;
use crate::db::LytafDB;
use crate::query::ArtifactSelector;
use crate::series::{write_catalogue_csv, write_series_csv, FilterOptions, LyraSeries};
use crate::storage::{AnnotationStore, AnnotationTable};
use anyhow::{bail, Context};
use std::fs::File;
use std::io::Write;
use std::path::Path;

fn read_series(path: &Path) -> anyhow::Result<LyraSeries> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    LyraSeries::from_json_reader(file).with_context(|| format!("reading series {}", path.display()))
}

/// Run one command, writing results to `out`
pub fn run<W: Write>(command: Commands, config: &LytafConfig, out: &mut W) -> anyhow::Result<()> {
    match command {
        Commands::Events {
            start,
            end,
            sources,
            csv,
        } => {
            let db = LytafDB::open(config)?;
            let range = TimeRange::new(start, end)?;
            let catalogue = db.get_events(&range, &sources)?;
            match csv {
                Some(path) => {
                    let file =
                        File::create(&path).with_context(|| format!("creating {}", path.display()))?;
                    write_catalogue_csv(file, &catalogue)?;
                    writeln!(out, "Wrote {} records to {}", catalogue.len(), path.display())?;
                }
                None => {
                    for record in &catalogue {
                        writeln!(out, "{}", record)?;
                    }
                }
            }
        }
        Commands::Types { sources } => {
            let db = LytafDB::open(config)?;
            for (source, defs) in db.event_types(&sources)? {
                writeln!(out, "[{}]", source)?;
                for def in defs {
                    writeln!(out, "  {}: {}", def.name, def.definition)?;
                }
            }
        }
        Commands::Translate { codes } => {
            for name in translate(&codes) {
                writeln!(out, "{}", name)?;
            }
        }
        Commands::Import { source, file } => {
            let reader =
                File::open(&file).with_context(|| format!("opening {}", file.display()))?;
            let table = AnnotationTable::from_json_reader(reader)
                .with_context(|| format!("parsing annotation table {}", file.display()))?;
            let store = AnnotationStore::open(&config.data_dir)?;
            let header = store.import(source, &table)?;
            writeln!(
                out,
                "Imported {} events and {} event types into {}",
                header.event_count,
                header.type_count,
                store.path_for(source).display()
            )?;
            if let Some(span) = header.span() {
                writeln!(out, "Events span {}", span)?;
            }
        }
        Commands::Filter {
            input,
            artifacts,
            sources,
            report,
            csv,
        } => {
            let series = read_series(&input)?;
            let selector = ArtifactSelector::parse(&artifacts)?;
            let options = FilterOptions {
                return_report: report,
            };
            let db = LytafDB::open(config)?;
            let filtered = db.remove_events_from_series(&series, Some(&selector), &sources, options)?;

            writeln!(
                out,
                "Removed {} of {} samples",
                filtered.removed_samples,
                series.len()
            )?;
            if let Some(report) = &filtered.report {
                writeln!(out, "{}", report.to_json_pretty()?)?;
            }
            if let Some(path) = csv {
                let mut columns = vec!["time".to_string()];
                columns.extend(filtered.series.channel_names().into_iter().map(String::from));
                let channels = filtered.series.channel_values();
                let file =
                    File::create(&path).with_context(|| format!("creating {}", path.display()))?;
                write_series_csv(
                    file,
                    filtered.series.time(),
                    Some(channels.as_slice()),
                    Some(columns.as_slice()),
                )?;
            }
        }
        Commands::Split {
            input,
            channel,
            sources,
        } => {
            let series = read_series(&input)?;
            let Some(data) = series.channel(&channel) else {
                bail!(
                    "channel '{}' not in series; available: {}",
                    channel,
                    series.channel_names().join(", ")
                );
            };
            let db = LytafDB::open(config)?;
            let segments = db.split_series(series.time(), &data.values, &sources)?;
            for segment in &segments {
                writeln!(out, "{} ({} samples)", segment.span()?, segment.len())?;
            }
        }
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::LytafSource;
    use crate::storage::CachePolicy;
    use tempfile::TempDir;

    const TABLE: &str = r#"{
        "event_types": [
            {"id": 1, "type": "LAR", "definition": "Large Angle Rotation."},
            {"id": 2, "type": "UV occ.", "definition": "Occultation in the UV spectrum."}
        ],
        "events": [
            {"insertion_time": 1371459961, "begin_time": 1359677220, "reference_time": 1359677250, "end_time": 1359677400, "type": 1},
            {"insertion_time": 1371460063, "begin_time": 1359681764, "reference_time": 1359682450, "end_time": 1359683136, "type": 2}
        ]
    }"#;

    fn setup() -> (TempDir, LytafConfig) {
        setup_with(CachePolicy::LocalOnly)
    }

    fn setup_with(cache_policy: CachePolicy) -> (TempDir, LytafConfig) {
        let dir = TempDir::new().unwrap();
        let config = LytafConfig {
            data_dir: dir.path().join("data"),
            default_sources: vec![LytafSource::Lyra],
            cache_policy,
            ..LytafConfig::default()
        };
        let table = dir.path().join("lyra.json");
        std::fs::write(&table, TABLE).unwrap();

        let mut out = Vec::new();
        run(
            Commands::Import {
                source: LytafSource::Lyra,
                file: table,
            },
            &config,
            &mut out,
        )
        .unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with("Imported 2 events"));
        assert!(out.ends_with(
            "Events span [2013-02-01T00:07:00+00:00, 2013-02-01T01:45:36+00:00]\n"
        ));
        (dir, config)
    }

    fn write_series(dir: &TempDir) -> std::path::PathBuf {
        let time: Vec<String> = (0..20)
            .map(|m| format!("2013-02-01T00:{:02}:00", m))
            .collect();
        let json = serde_json::json!({
            "time": time,
            "channels": [{"name": "CHANNEL1", "values": vec![1.0; 20]}],
        });
        let path = dir.path().join("series.json");
        std::fs::write(&path, json.to_string()).unwrap();
        path
    }

    #[test]
    fn test_filter_command() {
        let (dir, config) = setup();
        let input = write_series(&dir);
        let csv = dir.path().join("out.csv");

        let mut out = Vec::new();
        run(
            Commands::Filter {
                input,
                artifacts: "LAR".to_string(),
                sources: vec![],
                report: false,
                csv: Some(csv.clone()),
            },
            &config,
            &mut out,
        )
        .unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "Removed 4 of 20 samples\n");
        let written = std::fs::read_to_string(csv).unwrap();
        assert_eq!(written.lines().next(), Some("time,CHANNEL1"));
        assert_eq!(written.lines().count(), 17);
    }

    #[test]
    fn test_filter_with_default_cache_policy() {
        // The series runs past both ends of the stored events
        let (dir, config) = setup_with(CachePolicy::default());
        let input = write_series(&dir);

        for _ in 0..2 {
            let mut out = Vec::new();
            run(
                Commands::Filter {
                    input: input.clone(),
                    artifacts: "LAR".to_string(),
                    sources: vec![],
                    report: false,
                    csv: None,
                },
                &config,
                &mut out,
            )
            .unwrap();
            assert_eq!(String::from_utf8(out).unwrap(), "Removed 4 of 20 samples\n");
        }
    }

    #[test]
    fn test_split_command() {
        let (dir, config) = setup();
        let input = write_series(&dir);

        let mut out = Vec::new();
        run(
            Commands::Split {
                input: input.clone(),
                channel: "CHANNEL1".to_string(),
                sources: vec![],
            },
            &config,
            &mut out,
        )
        .unwrap();
        // LAR removes 00:07 through 00:10
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "[2013-02-01T00:00:00+00:00, 2013-02-01T00:06:00+00:00] (7 samples)\n\
             [2013-02-01T00:11:00+00:00, 2013-02-01T00:19:00+00:00] (9 samples)\n"
        );

        let err = run(
            Commands::Split {
                input,
                channel: "CHANNEL9".to_string(),
                sources: vec![],
            },
            &config,
            &mut Vec::new(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("CHANNEL9"));
    }

    #[test]
    fn test_translate_command() {
        let mut out = Vec::new();
        run(
            Commands::Translate {
                codes: vec![0, 1, 6, 12],
            },
            &LytafConfig::default(),
            &mut out,
        )
        .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "LAR\nSAA\n");
    }
}
