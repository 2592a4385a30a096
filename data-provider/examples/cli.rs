use anyhow::{Context, Result};
use data_provider::models::Post;
use data_provider::repository::ProviderRepository;
use std::env;

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        println!("Usage:");
        println!(" cargo run --example cli list");
        println!(" cargo run --example cli insert <userId> <title> <body>");
        println!(" cargo run --example cli update <id> <userId> <title> <body>");
        println!(" cargo run --example cli delete <id>");
        return Ok(());
    }

    let repo = ProviderRepository::new();
    let provider = repo
        .data_provider::<Post>()
        .context("Failed to resolve the posts provider")?;

    match args[1].as_str() {
        "list" => {
            for post in provider.get_all()? {
                println!("{}: [user {}] {}", post.id, post.user_id, post.title);
            }
            Ok(())
        }
        "insert" => {
            if args.len() < 5 {
                println!("Usage: cargo run --example cli insert <userId> <title> <body>");
                return Ok(());
            }
            let post = Post {
                id: 0,
                user_id: args[2].parse().context("userId must be an integer")?,
                title: args[3].clone(),
                body: args[4].clone(),
            };
            let id = provider.insert(post)?;
            println!("Inserted post {}", id);
            Ok(())
        }
        "update" => {
            if args.len() < 6 {
                println!("Usage: cargo run --example cli update <id> <userId> <title> <body>");
                return Ok(());
            }
            let id = args[2].parse().context("id must be an integer")?;
            let post = Post {
                id: 0,
                user_id: args[3].parse().context("userId must be an integer")?,
                title: args[4].clone(),
                body: args[5].clone(),
            };
            provider.update(id, post)?;
            println!("Updated post {} (if it existed)", id);
            Ok(())
        }
        "delete" => {
            if args.len() < 3 {
                println!("Usage: cargo run --example cli delete <id>");
                return Ok(());
            }
            let id = args[2].parse().context("id must be an integer")?;
            provider.delete(id)?;
            println!("Deleted post {} (if it existed)", id);
            Ok(())
        }
        _ => {
            eprintln!("Invalid command. Use 'list', 'insert', 'update' or 'delete'.");
            Ok(())
        }
    }
}
