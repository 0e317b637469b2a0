use base64::{engine::general_purpose::STANDARD, Engine};
use clap::{Args, Subcommand};
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use foodtracker_core::{CollectionError, Meal, MealCollection};

use super::OutputFormat;
use crate::config::Config;
use crate::rating::RatingControl;

#[derive(Args)]
pub struct MealCommand {
    #[command(subcommand)]
    pub command: MealSubcommand,
}

#[derive(Subcommand)]
pub enum MealSubcommand {
    /// List all meals
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show a meal's details
    Show {
        /// Position in the list (starting at 0)
        position: usize,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Add a new meal at the end of the list
    Add {
        /// Name of the meal
        name: String,

        /// Image file to attach
        #[arg(long, value_name = "FILE")]
        photo: Option<PathBuf>,

        /// Rating (0 means unrated)
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        rating: i64,
    },

    /// Edit an existing meal
    Edit {
        /// Position in the list (starting at 0)
        position: usize,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// Replace the photo with this image file
        #[arg(long, value_name = "FILE", conflicts_with = "no_photo")]
        photo: Option<PathBuf>,

        /// Remove the photo
        #[arg(long)]
        no_photo: bool,

        /// New rating
        #[arg(long, allow_negative_numbers = true)]
        rating: Option<i64>,
    },

    /// Tap a star; tapping the current rating clears it
    Rate {
        /// Position in the list (starting at 0)
        position: usize,

        /// Star to tap (starting at 1)
        star: u32,
    },

    /// Delete a meal
    Delete {
        /// Position in the list (starting at 0)
        position: usize,

        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },

    /// Write a meal's photo to a file
    Photo {
        /// Position in the list (starting at 0)
        position: usize,

        /// Destination file
        #[arg(long, short, value_name = "FILE")]
        output: PathBuf,
    },
}

/// JSON shape of a listed meal; photos are base64 encoded.
#[derive(Serialize)]
struct MealView<'a> {
    position: usize,
    name: &'a str,
    rating: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    photo: Option<String>,
}

impl<'a> MealView<'a> {
    fn new(position: usize, meal: &'a Meal) -> Self {
        Self {
            position,
            name: meal.name(),
            rating: meal.rating(),
            photo: meal.photo().map(|bytes| STANDARD.encode(bytes)),
        }
    }
}

impl MealCommand {
    pub fn run(
        &self,
        collection: &mut MealCollection,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let stars = config.star_count.value;

        match &self.command {
            MealSubcommand::List { format } => {
                if collection.is_empty() {
                    println!("No meals found");
                    return Ok(());
                }

                match format {
                    OutputFormat::Json => {
                        let views: Vec<_> = collection
                            .iter()
                            .enumerate()
                            .map(|(i, meal)| MealView::new(i, meal))
                            .collect();
                        println!("{}", serde_json::to_string_pretty(&views)?);
                    }
                    OutputFormat::Text => {
                        println!("{:<4}  {:<30}  {:<10}  PHOTO", "#", "NAME", "RATING");
                        println!("{}", "-".repeat(56));
                        for (i, meal) in collection.iter().enumerate() {
                            let name = if meal.name().chars().count() > 30 {
                                format!("{}...", meal.name().chars().take(27).collect::<String>())
                            } else {
                                meal.name().to_string()
                            };
                            let rating = RatingControl::new(stars, meal.rating());
                            let photo = if meal.has_photo() { "yes" } else { "" };
                            println!("{:<4}  {:<30}  {:<10}  {}", i, name, rating, photo);
                        }
                        println!("\nTotal: {} meal(s)", collection.len());
                    }
                }
                Ok(())
            }

            MealSubcommand::Show { position, format } => {
                let meal = selected(collection, *position)?;

                match format {
                    OutputFormat::Json => {
                        let view = MealView::new(*position, meal);
                        println!("{}", serde_json::to_string_pretty(&view)?);
                    }
                    OutputFormat::Text => {
                        print!("{}", meal);
                        println!("Stars: {}", RatingControl::new(stars, meal.rating()));
                    }
                }
                Ok(())
            }

            MealSubcommand::Add {
                name,
                photo,
                rating,
            } => {
                let photo = photo.as_deref().map(read_photo).transpose()?;
                let meal = Meal::new(name.as_str(), photo, *rating)?;

                let position = commit(collection.upsert(meal, None))?;
                println!("Added meal at position {}:", position);
                print!("{}", collection.meals()[position]);
                Ok(())
            }

            MealSubcommand::Edit {
                position,
                name,
                photo,
                no_photo,
                rating,
            } => {
                if name.is_none() && photo.is_none() && !no_photo && rating.is_none() {
                    return Err("Nothing to update. Provide at least one option.".into());
                }

                let mut edited = selected(collection, *position)?.clone();

                if let Some(new_name) = name {
                    edited = edited.with_name(new_name.as_str())?;
                }
                if *no_photo {
                    edited = edited.with_photo(None);
                } else if let Some(path) = photo {
                    edited = edited.with_photo(Some(read_photo(path)?));
                }
                if let Some(new_rating) = rating {
                    edited = edited.with_rating(*new_rating)?;
                }

                let position = commit(collection.upsert(edited, Some(*position)))?;
                println!("Updated meal at position {}:", position);
                print!("{}", collection.meals()[position]);
                Ok(())
            }

            MealSubcommand::Rate { position, star } => {
                let meal = selected(collection, *position)?.clone();

                let mut control = RatingControl::new(stars, meal.rating());
                let rating = control.tap(*star)?;
                let rated = meal.with_rating(rating)?;

                commit(collection.upsert(rated, Some(*position)))?;
                println!(
                    "Rated '{}': {}",
                    collection.meals()[*position].name(),
                    control
                );
                Ok(())
            }

            MealSubcommand::Delete { position, force } => {
                let name = selected(collection, *position)?.name().to_string();

                // Confirm deletion unless --force is used
                if !force {
                    print!("Delete meal '{}'? [y/N] ", name);
                    io::stdout().flush()?;

                    let mut input = String::new();
                    io::stdin().read_line(&mut input)?;

                    if !input.trim().eq_ignore_ascii_case("y") {
                        println!("Deletion cancelled.");
                        return Ok(());
                    }
                }

                commit(collection.remove_at(*position).map(|_| *position))?;
                println!("Deleted meal: {}", name);
                Ok(())
            }

            MealSubcommand::Photo { position, output } => {
                let meal = selected(collection, *position)?;
                let photo = meal
                    .photo()
                    .ok_or_else(|| format!("Meal '{}' has no photo", meal.name()))?;

                fs::write(output, photo).map_err(|e| {
                    format!("Failed to write photo '{}': {}", output.display(), e)
                })?;
                println!("Wrote {} bytes to {}", photo.len(), output.display());
                Ok(())
            }
        }
    }
}

/// Looks up the meal at `position`, turning a miss into a user-facing error.
fn selected(collection: &MealCollection, position: usize) -> Result<&Meal, String> {
    collection.get(position).ok_or_else(|| {
        format!(
            "Meal not found at position {} ({} meal(s) in list)",
            position,
            collection.len()
        )
    })
}

/// Unwraps a mutation result, downgrading a failed save to a warning.
///
/// The change is already applied in memory, so the command still reports it.
fn commit(result: Result<usize, CollectionError>) -> Result<usize, CollectionError> {
    match result {
        Err(CollectionError::Unsaved { position, source }) => {
            eprintln!("Warning: change may not be durable: {}", source);
            Ok(position)
        }
        other => other,
    }
}

fn read_photo(path: &Path) -> Result<Vec<u8>, String> {
    fs::read(path).map_err(|e| format!("Failed to read photo '{}': {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use foodtracker_core::MealArchive;
    use tempfile::TempDir;

    struct Fixture {
        collection: MealCollection,
        config: Config,
        dir: TempDir,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.yaml");
        fs::write(&config_path, "data_dir: data\nstar_count: 5\n").unwrap();

        let config = Config::load(Some(config_path)).unwrap();
        let collection = MealCollection::load(config.archive());
        Fixture {
            collection,
            config,
            dir,
        }
    }

    fn run(fx: &mut Fixture, command: MealSubcommand) -> Result<(), Box<dyn std::error::Error>> {
        MealCommand { command }.run(&mut fx.collection, &fx.config)
    }

    fn add(fx: &mut Fixture, name: &str, rating: i64) {
        run(
            fx,
            MealSubcommand::Add {
                name: name.to_string(),
                photo: None,
                rating,
            },
        )
        .unwrap();
    }

    fn reloaded(fx: &Fixture) -> MealCollection {
        MealCollection::load(fx.config.archive())
    }

    #[test]
    fn test_add_appends_and_saves() {
        let mut fx = fixture();
        add(&mut fx, "Lasagna", 4);
        add(&mut fx, "Salad", 2);

        let saved = reloaded(&fx);
        assert_eq!(saved.len(), 2);
        assert_eq!(saved.get(1).unwrap().name(), "Salad");
    }

    #[test]
    fn test_add_rejects_empty_name() {
        let mut fx = fixture();
        let result = run(
            &mut fx,
            MealSubcommand::Add {
                name: String::new(),
                photo: None,
                rating: 1,
            },
        );

        assert!(result.is_err());
        assert!(fx.collection.is_empty());
    }

    #[test]
    fn test_add_rejects_negative_rating() {
        let mut fx = fixture();
        let result = run(
            &mut fx,
            MealSubcommand::Add {
                name: "Soup".to_string(),
                photo: None,
                rating: -1,
            },
        );

        assert!(result.is_err());
        assert!(fx.collection.is_empty());
    }

    #[test]
    fn test_add_with_photo_file() {
        let mut fx = fixture();
        let photo_path = fx.dir.path().join("pic.jpg");
        fs::write(&photo_path, b"\xff\xd8\xff\xe0").unwrap();

        run(
            &mut fx,
            MealSubcommand::Add {
                name: "Pancakes".to_string(),
                photo: Some(photo_path),
                rating: 3,
            },
        )
        .unwrap();

        let saved = reloaded(&fx);
        assert_eq!(saved.get(0).unwrap().photo(), Some(&b"\xff\xd8\xff\xe0"[..]));
    }

    #[test]
    fn test_edit_replaces_in_place() {
        let mut fx = fixture();
        add(&mut fx, "Alice", 4);
        add(&mut fx, "Bob", 2);

        run(
            &mut fx,
            MealSubcommand::Edit {
                position: 0,
                name: Some("Alicia".to_string()),
                photo: None,
                no_photo: false,
                rating: Some(5),
            },
        )
        .unwrap();

        let saved = reloaded(&fx);
        assert_eq!(saved.len(), 2);
        assert_eq!(saved.get(0).unwrap().name(), "Alicia");
        assert_eq!(saved.get(0).unwrap().rating(), 5);
        assert_eq!(saved.get(1).unwrap().name(), "Bob");
    }

    #[test]
    fn test_edit_requires_a_change() {
        let mut fx = fixture();
        add(&mut fx, "Alice", 4);

        let result = run(
            &mut fx,
            MealSubcommand::Edit {
                position: 0,
                name: None,
                photo: None,
                no_photo: false,
                rating: None,
            },
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_edit_invalid_name_leaves_meal_untouched() {
        let mut fx = fixture();
        add(&mut fx, "Alice", 4);

        let result = run(
            &mut fx,
            MealSubcommand::Edit {
                position: 0,
                name: Some(String::new()),
                photo: None,
                no_photo: false,
                rating: None,
            },
        );

        assert!(result.is_err());
        assert_eq!(fx.collection.get(0).unwrap().name(), "Alice");
    }

    #[test]
    fn test_edit_unknown_position() {
        let mut fx = fixture();
        let result = run(
            &mut fx,
            MealSubcommand::Edit {
                position: 3,
                name: Some("Ghost".to_string()),
                photo: None,
                no_photo: false,
                rating: None,
            },
        );

        assert!(result.is_err());
        assert!(fx.collection.is_empty());
    }

    #[test]
    fn test_rate_toggles_through_control() {
        let mut fx = fixture();
        add(&mut fx, "Tacos", 0);

        run(&mut fx, MealSubcommand::Rate { position: 0, star: 3 }).unwrap();
        assert_eq!(reloaded(&fx).get(0).unwrap().rating(), 3);

        run(&mut fx, MealSubcommand::Rate { position: 0, star: 3 }).unwrap();
        assert_eq!(reloaded(&fx).get(0).unwrap().rating(), 0);
    }

    #[test]
    fn test_rate_rejects_star_beyond_count() {
        let mut fx = fixture();
        add(&mut fx, "Tacos", 2);

        let result = run(&mut fx, MealSubcommand::Rate { position: 0, star: 6 });
        assert!(result.is_err());
        assert_eq!(fx.collection.get(0).unwrap().rating(), 2);
    }

    #[test]
    fn test_delete_forced() {
        let mut fx = fixture();
        add(&mut fx, "A", 1);
        add(&mut fx, "B", 1);
        add(&mut fx, "C", 1);

        run(
            &mut fx,
            MealSubcommand::Delete {
                position: 1,
                force: true,
            },
        )
        .unwrap();

        let saved = reloaded(&fx);
        let names: Vec<_> = saved.iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["A", "C"]);
    }

    #[test]
    fn test_photo_export() {
        let mut fx = fixture();
        let photo_path = fx.dir.path().join("in.png");
        fs::write(&photo_path, b"\x89PNG").unwrap();
        run(
            &mut fx,
            MealSubcommand::Add {
                name: "Pho".to_string(),
                photo: Some(photo_path),
                rating: 5,
            },
        )
        .unwrap();

        let output = fx.dir.path().join("out.png");
        run(
            &mut fx,
            MealSubcommand::Photo {
                position: 0,
                output: output.clone(),
            },
        )
        .unwrap();
        assert_eq!(fs::read(&output).unwrap(), b"\x89PNG");
    }

    #[test]
    fn test_photo_export_without_photo_fails() {
        let mut fx = fixture();
        add(&mut fx, "Plain rice", 1);

        let output = fx.dir.path().join("out.png");
        let result = run(&mut fx, MealSubcommand::Photo { position: 0, output });
        assert!(result.is_err());
    }

    #[test]
    fn test_unsaved_change_is_reported_as_success() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"").unwrap();
        let mut collection = MealCollection::load(MealArchive::in_dir(&blocker));

        let meal = Meal::new("Volatile", None, 1).unwrap();
        let position = commit(collection.append(meal)).unwrap();

        assert_eq!(position, 0);
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn test_meal_view_encodes_photo() {
        let meal = Meal::new("Pie", Some(vec![1, 2, 3]), 4).unwrap();
        let json = serde_json::to_value(MealView::new(2, &meal)).unwrap();

        assert_eq!(json["position"], 2);
        assert_eq!(json["name"], "Pie");
        assert_eq!(json["rating"], 4);
        assert_eq!(json["photo"], "AQID");
    }

    #[test]
    fn test_meal_view_omits_missing_photo() {
        let meal = Meal::new("Pie", None, 4).unwrap();
        let json = serde_json::to_value(MealView::new(0, &meal)).unwrap();
        assert!(json.get("photo").is_none());
    }
}
