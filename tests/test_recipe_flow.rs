use serde_json::json;
use spicebox::{Spicebox, SpiceboxError};

fn pancakes() -> serde_json::Value {
    json!({
        "name": "  pancakes ",
        "steps": "mix and fry",
        "ingredients": [
            {"name": "flour", "quantity": "200", "unit": "gramas"},
            {"name": "milk", "quantity": "250", "unit": "mls"},
            {"name": "egg", "quantity": 2, "unit": "unit"}
        ]
    })
}

fn seeded() -> Spicebox {
    let app = Spicebox::in_memory().unwrap();
    app.recipes.add(&pancakes()).unwrap();
    app.spices
        .add(&json!({
            "name": "cinnamon",
            "flavor_profile": "Sweet and woody",
            "recommended_quantity": "1 tsp",
            "pairs_with_ingredients": ["flour", "milk", "apple"]
        }))
        .unwrap();
    app.spices
        .add(&json!({
            "name": "nutmeg",
            "pairs_with_ingredients": "milk"
        }))
        .unwrap();
    app.spices
        .add(&json!({
            "name": "cumin",
            "pairs_with_ingredients": "lamb, rice"
        }))
        .unwrap();
    app
}

#[tokio::test]
async fn test_adding_same_recipe_twice_keeps_first() {
    let app = seeded();
    let first = app.recipes.get("Pancakes").unwrap();

    let mut second = pancakes();
    second["steps"] = json!("something else entirely");
    let err = app.recipes.add(&second).unwrap_err();

    assert!(matches!(err, SpiceboxError::AlreadyExists(_)));
    assert_eq!(err.to_string(), "Recipe name 'Pancakes' already exists.");
    assert_eq!(app.recipes.get("Pancakes").unwrap(), first);
    assert_eq!(app.recipes.list().unwrap().len(), 1);
}

#[tokio::test]
async fn test_link_to_missing_recipe_changes_nothing() {
    let app = seeded();
    let before = app.spices.get("Cinnamon").unwrap();

    let err = app
        .spices
        .link(&json!({"spice_name": "cinnamon", "recipe_name": "waffles"}))
        .unwrap_err();

    assert!(matches!(err, SpiceboxError::NotFound(_)));
    assert_eq!(app.spices.get("Cinnamon").unwrap(), before);
    assert!(app.bridge.spices_for_recipe("Waffles").unwrap().is_empty());
}

#[tokio::test]
async fn test_suggest_ranks_by_overlap() {
    let app = seeded();
    let suggestions = app.spices.suggest("pancakes").unwrap();

    let ranked: Vec<(&str, usize)> = suggestions
        .iter()
        .map(|s| (s.name.as_str(), s.match_score))
        .collect();
    assert_eq!(ranked, vec![("Cinnamon", 2), ("Nutmeg", 1)]);
    assert_eq!(suggestions[0].recommended_quantity, "1 tsp");
}

#[tokio::test]
async fn test_link_learns_and_boosts_score() {
    let app = seeded();
    let link = app
        .spices
        .link(&json!({"spice_name": " NUTMEG", "recipe_name": "pancakes"}))
        .unwrap();
    assert_eq!(link.spice_name, "Nutmeg");

    let nutmeg = app.spices.get("nutmeg").unwrap();
    assert!(nutmeg.pairs_with_recipes.contains("Pancakes"));

    // one shared ingredient plus the recipe pairing
    let suggestions = app.spices.suggest("Pancakes").unwrap();
    let score = suggestions
        .iter()
        .find(|s| s.name == "Nutmeg")
        .map(|s| s.match_score);
    assert_eq!(score, Some(2));

    assert_eq!(app.recipes.get("Pancakes").unwrap().spices, vec!["Nutmeg"]);
}

#[tokio::test]
async fn test_duplicate_link_rejected() {
    let app = seeded();
    let link = json!({"spice_name": "cinnamon", "recipe_name": "pancakes"});
    app.spices.link(&link).unwrap();

    let err = app.spices.link(&link).unwrap_err();
    assert_eq!(err.to_string(), "'Cinnamon' already linked to 'Pancakes'.");
}

#[tokio::test]
async fn test_unlink() {
    let app = seeded();
    let link = json!({"spice_name": "cumin", "recipe_name": "pancakes"});

    let err = app.spices.unlink(&link).unwrap_err();
    assert_eq!(err.to_string(), "'Cumin' not linked to 'Pancakes'.");

    app.spices.link(&link).unwrap();
    app.spices.unlink(&link).unwrap();
    assert!(app.recipes.get("Pancakes").unwrap().spices.is_empty());
}

#[tokio::test]
async fn test_recipe_with_spices_teaches_them_its_ingredients() {
    let app = seeded();
    let recipe = app
        .recipes
        .add(&json!({
            "name": "lamb pilaf",
            "steps": "brown and simmer",
            "ingredients": [
                {"name": "lamb", "quantity": "500", "unit": "gramas"},
                {"name": "onion", "quantity": "1", "unit": "unit"}
            ],
            "spices": "cumin"
        }))
        .unwrap();
    assert_eq!(recipe.spices, vec!["Cumin"]);

    let cumin = app.spices.get("Cumin").unwrap();
    assert!(cumin.pairs_with_ingredients.contains("Onion"));
    assert!(cumin.pairs_with_recipes.contains("Lamb Pilaf"));
}

#[tokio::test]
async fn test_delete_recipe_drops_links() {
    let app = seeded();
    app.spices
        .link(&json!({"spice_name": "cinnamon", "recipe_name": "pancakes"}))
        .unwrap();

    app.recipes.remove("pancakes").unwrap();
    assert!(matches!(
        app.recipes.get("Pancakes"),
        Err(SpiceboxError::NotFound(_))
    ));

    let cinnamon = app.spices.get("Cinnamon").unwrap();
    assert!(!cinnamon.pairs_with_recipes.contains("Pancakes"));

    // a new recipe with the old name starts without links or pairing credit
    app.recipes.add(&pancakes()).unwrap();
    assert!(app.recipes.get("Pancakes").unwrap().spices.is_empty());
    let score = app
        .spices
        .suggest("Pancakes")
        .unwrap()
        .into_iter()
        .find(|s| s.name == "Cinnamon")
        .map(|s| s.match_score);
    assert_eq!(score, Some(2));
}

#[tokio::test]
async fn test_names_with_commas_rejected() {
    let app = seeded();

    let err = app
        .recipes
        .add(&json!({
            "name": "chicken, rice and beans",
            "steps": "simmer",
            "ingredients": [{"name": "chicken", "quantity": 1, "unit": "unit"}]
        }))
        .unwrap_err();
    assert!(matches!(err, SpiceboxError::InvalidStructure(_)));
    assert_eq!(err.to_string(), "Invalid structure: name cannot contain commas");
    assert_eq!(app.recipes.list().unwrap().len(), 1);

    let err = app.spices.add(&json!({"name": "salt, pepper"})).unwrap_err();
    assert!(matches!(err, SpiceboxError::InvalidStructure(_)));

    let err = app
        .recipes
        .rename(&json!({"old_name": "pancakes", "new_name": "pancakes, thin"}))
        .unwrap_err();
    assert!(matches!(err, SpiceboxError::InvalidStructure(_)));
    assert!(app.recipes.get("Pancakes").is_ok());
}

#[tokio::test]
async fn test_rename_recipe_carries_links() {
    let app = seeded();
    app.spices
        .link(&json!({"spice_name": "cinnamon", "recipe_name": "pancakes"}))
        .unwrap();

    app.recipes
        .rename(&json!({"old_name": "pancakes", "new_name": "fluffy pancakes"}))
        .unwrap();

    let renamed = app.recipes.get("Fluffy Pancakes").unwrap();
    assert_eq!(renamed.spices, vec!["Cinnamon"]);
    let cinnamon = app.spices.get("Cinnamon").unwrap();
    assert!(cinnamon.pairs_with_recipes.contains("Fluffy Pancakes"));
    assert!(!cinnamon.pairs_with_recipes.contains("Pancakes"));
}

#[tokio::test]
async fn test_swap_and_remove_recipe_ingredients() {
    let app = seeded();
    app.recipes
        .swap_ingredient(&json!({
            "recipe_name": "pancakes",
            "old_ingredient": "milk",
            "new_ingredient": "oat milk",
            "unit": "mililitros"
        }))
        .unwrap();
    app.recipes.remove_ingredient("pancakes", "egg").unwrap();

    let recipe = app.recipes.get("Pancakes").unwrap();
    let names: Vec<&str> = recipe.ingredient_names().collect();
    assert_eq!(names, vec!["Flour", "Oat Milk"]);
    assert_eq!(recipe.ingredients[1].quantity, 250.0);
    assert_eq!(recipe.ingredients[1].unit, "Mls");

    let err = app.recipes.remove_ingredient("pancakes", "egg").unwrap_err();
    assert_eq!(err.to_string(), "Ingredient 'Egg' not found in 'Pancakes'.");
}
