use dotenv::dotenv;
use std::env;
use std::io::{self, BufRead, Write};
use storefront_rust::categories::{CategoryAction, CategoryNode};
use storefront_rust::prelude::*;

fn print_tree(nodes: &[CategoryNode], depth: usize) {
    for node in nodes {
        println!(
            "{}- {} ({}) [{}]",
            "  ".repeat(depth),
            node.category.name,
            node.category.slug,
            node.category.id
        );
        print_tree(&node.children, depth + 1);
    }
}

fn ask(prompt: &str) -> bool {
    print!("{} [y/N] ", prompt);
    let _ = io::stdout().flush();
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line).is_err() {
        return false;
    }
    matches!(line.trim(), "y" | "Y" | "yes")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();
    env_logger::init();

    let api_url = env::var("STOREFRONT_API_URL").unwrap_or_else(|_| "http://localhost:5000/api".to_string());
    let token = env::var("STOREFRONT_ADMIN_TOKEN")
        .map_err(|_| anyhow::anyhow!("STOREFRONT_ADMIN_TOKEN must be set"))?;

    let storefront = Storefront::new(&api_url)?;
    storefront.sign_in_admin(&token);
    let store = storefront.categories();

    println!("Fetching category hierarchy from {}", api_url);
    if !store.fetch_categories(FetchOptions::new().with_hierarchy(true)).await {
        anyhow::bail!("fetch failed: {}", store.snapshot().error.unwrap_or_default());
    }
    print_tree(store.snapshot().categories(), 0);

    // Create a demo category through the form, letting the slug follow the name
    store.dispatch(CategoryAction::EditName("Demo Trail Shoes".to_string()));
    store.dispatch(CategoryAction::EditDescription("Created by the category_admin demo".to_string()));
    println!("\nCreating category with slug {}", store.snapshot().form.draft.slug);

    if store.submit().await {
        let state = store.snapshot();
        println!(
            "{}",
            state
                .success_message(std::time::Instant::now())
                .unwrap_or("Category saved")
        );
        print_tree(state.categories(), 0);
    } else {
        println!("Create failed: {}", store.snapshot().error.unwrap_or_default());
        return Ok(());
    }

    let created = store
        .snapshot()
        .flat
        .iter()
        .find(|c| c.slug == "demo-trail-shoes")
        .cloned();

    if let Some(category) = created {
        if store.delete_category(&category.id, &ask).await {
            println!("Deleted {}", category.name);
        } else if let Some(error) = store.snapshot().error {
            println!("Delete failed: {}", error);
        } else {
            println!("Kept {}", category.name);
        }
    }

    Ok(())
}
