use clap::Subcommand;
use nudgely_core::HabitDb;

#[derive(Subcommand)]
pub enum CategoryAction {
    /// List categories
    List,
    /// Add a category
    Add {
        /// Category name
        name: String,
    },
    /// Delete a category (habits keep their category label)
    Delete {
        /// Category name
        name: String,
    },
}

pub fn run(action: CategoryAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = HabitDb::open()?;

    match action {
        CategoryAction::List => {
            let categories = db.list_categories()?;
            println!("{}", serde_json::to_string_pretty(&categories)?);
        }
        CategoryAction::Add { name } => {
            if db.add_category(&name)? {
                println!("Category added: {}", name.trim());
            } else {
                return Err(format!("category already exists or is empty: {name}").into());
            }
        }
        CategoryAction::Delete { name } => {
            if db.delete_category(&name)? {
                println!("Category deleted: {name}");
            } else {
                return Err(format!("no such category: {name}").into());
            }
        }
    }
    Ok(())
}
