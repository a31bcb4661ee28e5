use clap::Parser;
use feed_client::{Feed, FeedApi, FeedClientHttp, FeedScope, PostInput};

#[derive(Parser, Debug)]
struct Cli {
    #[clap(short, long)]
    server: Option<String>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Parser, Debug)]
enum Command {
    /// Store a bearer token for later commands.
    SetToken { token: String },
    /// Global feed.
    Feed {
        #[clap(long, default_value_t = 1)]
        page: u32,
    },
    Group {
        slug: String,
        #[clap(long, default_value_t = 1)]
        page: u32,
    },
    Profile {
        username: String,
        #[clap(long, default_value_t = 1)]
        page: u32,
    },
    /// Posts by the authors you follow.
    Following {
        #[clap(long, default_value_t = 1)]
        page: u32,
    },
    Follow { username: String },
    Unfollow { username: String },
    Show { id: i64 },
    CreatePost {
        #[clap(long)]
        text: String,
        #[clap(long)]
        group_id: Option<i64>,
        #[clap(long)]
        image: Option<String>,
    },
    EditPost {
        id: i64,
        #[clap(long)]
        text: Option<String>,
        #[clap(long, conflicts_with = "clear_group")]
        group_id: Option<i64>,
        /// Take the post out of its group.
        #[clap(long)]
        clear_group: bool,
    },
    DeletePost { id: i64 },
    Comment {
        post_id: i64,
        #[clap(long)]
        text: String,
    },
}

fn print_feed(feed: &Feed) {
    match &feed.scope {
        FeedScope::Global => println!("All posts"),
        FeedScope::Group { group } => println!("{} ({})", group.title, group.description),
        FeedScope::Author { author, following } => println!(
            "Posts by {}{}",
            author.username,
            if *following { " (following)" } else { "" }
        ),
        FeedScope::Subscriptions => println!("Posts by authors you follow"),
    }

    let page = &feed.page;
    println!(
        "Page {}/{} - {} posts total",
        page.number,
        page.num_pages.max(1),
        page.total_count
    );
    for post in &page.items {
        println!("- {post}");
    }
    if page.has_next {
        println!("(more: --page {})", page.number + 1);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();

    let endpoint = args.server.as_deref().unwrap_or("http://127.0.0.1:8080");
    let mut client = FeedClientHttp::connect(endpoint)?;

    match args.command {
        Command::SetToken { token } => {
            client.set_token(token)?;
            println!("Token saved");
        }
        Command::Feed { page } => print_feed(&client.global_feed(page).await?),
        Command::Group { slug, page } => print_feed(&client.group_feed(&slug, page).await?),
        Command::Profile { username, page } => {
            print_feed(&client.profile_feed(&username, page).await?)
        }
        Command::Following { page } => print_feed(&client.subscription_feed(page).await?),
        Command::Follow { username } => {
            let resp = client.follow(&username).await?;
            if resp.changed {
                println!("Now following {}", resp.author);
            } else {
                println!("Already following {}", resp.author);
            }
        }
        Command::Unfollow { username } => {
            let resp = client.unfollow(&username).await?;
            if resp.changed {
                println!("Unfollowed {}", resp.author);
            } else {
                println!("Was not following {}", resp.author);
            }
        }
        Command::Show { id } => {
            let detail = client.get_post(id).await?;
            println!("{}", detail.post);
            if let Some(group) = detail.group {
                println!("in group: {}", group.title);
            }
            println!("Comments ({})", detail.comments.len());
            for comment in detail.comments {
                println!("  {}: {}", comment.author_id, comment.text);
            }
        }
        Command::CreatePost {
            text,
            group_id,
            image,
        } => {
            let post = client
                .create_post(PostInput {
                    text: Some(text),
                    group_id: group_id.map(Some),
                    image: image.map(Some),
                })
                .await?;
            println!("Post created! ID: {}", post.id);
        }
        Command::EditPost {
            id,
            text,
            group_id,
            clear_group,
        } => {
            let group_id = if clear_group {
                Some(None)
            } else {
                group_id.map(Some)
            };
            let post = client
                .update_post(
                    id,
                    PostInput {
                        text,
                        group_id,
                        image: None,
                    },
                )
                .await?;
            println!("Post updated: {post}");
        }
        Command::DeletePost { id } => {
            client.delete_post(id).await?;
            println!("Post deleted!");
        }
        Command::Comment { post_id, text } => {
            let comment = client.add_comment(post_id, text).await?;
            println!("Comment added! ID: {}", comment.id);
        }
    }

    Ok(())
}
