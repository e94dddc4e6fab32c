use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, MultiSelect, Select};
use merch_hub::categories::CategoryValue;

/// Yes/No question answered with the arrow keys
pub fn prompt_confirmation(prompt: &str, default_yes: bool) -> Result<bool> {
    let items = vec!["Yes", "No"];
    let default_index = if default_yes { 0 } else { 1 };

    let selection = Select::new()
        .with_prompt(prompt)
        .items(&items)
        .default(default_index)
        .interact()?;

    Ok(selection == 0)
}

pub fn prompt_environment_selection(env_names: &[&String], current_env: Option<&str>) -> Result<String> {
    let items: Vec<String> = env_names
        .iter()
        .map(|env| {
            if current_env == Some(env.as_str()) {
                format!("{} (current)", env)
            } else {
                env.to_string()
            }
        })
        .collect();

    let selection = Select::new()
        .with_prompt("Select environment")
        .items(&items)
        .default(0)
        .interact()?;

    Ok(env_names[selection].to_string())
}

/// Pick categories with space, confirm with enter
pub fn prompt_category_selection(categories: &[CategoryValue]) -> Result<Vec<CategoryValue>> {
    let items: Vec<String> = categories
        .iter()
        .map(|category| match &category.code_value {
            Some(code) => format!("{} [{}] ({})", category.value, code, category.count),
            None => format!("{} ({})", category.value, category.count),
        })
        .collect();

    let selected = MultiSelect::with_theme(&ColorfulTheme::default())
        .with_prompt("Select categories to generate listings for")
        .items(&items)
        .interact()?;

    Ok(selected
        .into_iter()
        .map(|index| categories[index].clone())
        .collect())
}
