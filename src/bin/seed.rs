// Fill the configured database with demo authors, groups, posts and follows

use yatube::{
    app_state::AppState,
    config::Config,
    error::AppResult,
    models::{NewPost, PostFilter},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;
    println!("🚀 Seeding sample data into {}", config.database.url);
    let state = AppState::new(config).await?;

    seed(&state).await?;

    println!("\n🎯 Sample data generation complete!");
    Ok(())
}

async fn seed(state: &AppState) -> AppResult<()> {
    let db = &state.db;

    let sample_authors = vec![
        ("alice_johnson", "Alice Johnson"),
        ("bob_smith", "Bob Smith"),
        ("carol_wilson", "Carol Wilson"),
        ("david_brown", "David Brown"),
        ("eve_davis", "Eve Davis"),
    ];

    println!("\n👥 Creating {} authors...", sample_authors.len());
    let mut authors = Vec::new();
    for (username, full_name) in sample_authors {
        let author = match db.get_author_by_username(username).await? {
            Some(existing) => existing,
            None => db.create_author(username, full_name).await?,
        };
        println!("  ✓ Author '{}' with ID: {}", author.username, author.id);
        authors.push(author);
    }

    let sample_groups = vec![
        ("Rust", "rust", "Systems programming without fear"),
        ("Travel", "travel", "Notes from the road"),
        ("Cats", "cats", "Everything about cats"),
    ];

    println!("\n🏷️ Creating {} groups...", sample_groups.len());
    let mut groups = Vec::new();
    for (title, slug, description) in sample_groups {
        let group = match db.get_group_by_slug(slug).await? {
            Some(existing) => existing,
            None => db.create_group(title, slug, description).await?,
        };
        println!("  ✓ Group '{}' at /group/{}/", group.title, group.slug);
        groups.push(group);
    }

    // Authors that already have posts were seeded by an earlier run
    let mut already_posted = Vec::new();
    for author in &authors {
        already_posted.push(db.count_posts(PostFilter::Author(author.id)).await? > 0);
    }

    println!("\n📝 Creating sample posts...");
    let sample_posts = vec![
        (0, Some(0), "Ownership finally clicked for me today. Borrowing next!"),
        (1, Some(1), "Three days hiking along the coast, photos coming soon."),
        (2, Some(2), "The cat has claimed the new keyboard as a bed."),
        (3, None, "Started keeping a reading list, suggestions welcome."),
        (4, Some(0), "Async traits are so much nicer than they used to be."),
        (0, Some(1), "Airport lounges are underrated places to write code."),
        (1, None, "Sunday bread baking experiment number four."),
        (2, Some(2), "Cats and cardboard boxes: a field study."),
        (3, Some(0), "Pattern matching makes state machines pleasant."),
        (4, None, "Trying out a standing desk this week."),
        (0, Some(2), "Our cat learned to open the fridge."),
        (1, Some(1), "Night train from Vienna to Venice, highly recommended."),
    ];

    for (author_idx, group_idx, text) in &sample_posts {
        let author = &authors[*author_idx];
        if already_posted[*author_idx] {
            continue;
        }
        let post = db
            .create_post(NewPost {
                text: text.to_string(),
                author_id: author.id,
                group_id: group_idx.map(|idx| groups[idx].id),
                image: None,
            })
            .await?;
        println!("  ✓ Created post by {} (ID: {})", author.username, post.id);
    }

    for (author, posted) in authors.iter().zip(&already_posted) {
        if *posted {
            println!("  ↷ Skipped posts for {} (already has posts)", author.username);
        }
    }

    println!("\n🤝 Creating follows...");
    let follows = vec![(0, 1), (0, 2), (1, 0), (2, 3), (3, 4), (4, 0)];
    for (user_idx, author_idx) in follows {
        let user = &authors[user_idx];
        let author = &authors[author_idx];
        let created = db.create_follow(author.id, user.id).await?;
        let note = if created { "" } else { " (already following)" };
        println!("  ✓ {} follows {}{}", user.username, author.username, note);
    }

    println!("\n🔑 Session tokens (send as `Authorization: Bearer <token>` or `sessionid` cookie):");
    for author in &authors {
        let token = db.create_session(author.id).await?;
        println!("  {}: {}", author.username, token);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use yatube::infrastructure::{database::DatabaseInterface, sqlite_database::SqliteDatabase};

    #[tokio::test]
    async fn test_seeding_twice_keeps_one_set_of_posts() {
        let db: Arc<dyn DatabaseInterface> =
            Arc::new(SqliteDatabase::new_in_memory().await.unwrap());
        let state = AppState::with_database(Config::default(), db.clone());

        seed(&state).await.unwrap();
        assert_eq!(db.count_posts(PostFilter::All).await.unwrap(), 12);

        seed(&state).await.unwrap();
        assert_eq!(db.count_posts(PostFilter::All).await.unwrap(), 12);
        assert_eq!(db.list_groups().await.unwrap().len(), 3);
    }
}
