use std::sync::Arc;

use admin_core::AdminSession;
use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use shared::domain::{ContactId, ContactStatus, TestimonialId};
use store::{load_settings, RestStore};
use uuid::Uuid;

#[derive(Parser, Debug)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List testimonials in display order.
    Testimonials,
    /// Drag one testimonial onto another's position and persist the order.
    MoveTestimonial { active_id: Uuid, over_id: Uuid },
    /// Delete a testimonial.
    DeleteTestimonial { id: Uuid },
    /// List portfolio items, drafts included.
    Portfolio,
    /// List contact submissions, newest first.
    Contacts,
    /// Mark a contact submission as read.
    MarkContactRead { id: Uuid },
    /// Record counts per collection.
    Counts,
    /// Trigger the hosting provider's deploy hook.
    Deploy,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let cli = Cli::parse();
    let settings = load_settings();
    let store = Arc::new(RestStore::new(&settings));
    let mut session = AdminSession::new(store);

    match cli.command {
        Command::Testimonials => {
            for row in session.load_testimonials().await {
                println!(
                    "{:>3}  {}  {}  [{}]",
                    row.display_order,
                    row.id,
                    row.client_name,
                    if row.is_published { "published" } else { "draft" }
                );
            }
        }
        Command::MoveTestimonial { active_id, over_id } => {
            session.load_testimonials().await;
            let writes =
                session.move_testimonial(TestimonialId(active_id), TestimonialId(over_id))?;
            for write in writes {
                match write.task.await? {
                    Ok(()) => println!(
                        "persisted {} -> display_order {}",
                        write.update.id, write.update.display_order
                    ),
                    Err(err) => println!("write for {} failed: {err}", write.update.id),
                }
            }
        }
        Command::DeleteTestimonial { id } => {
            session.load_testimonials().await;
            session.delete_testimonial(TestimonialId(id)).await??;
            println!("deleted {id}");
        }
        Command::Portfolio => {
            for row in session.load_portfolio().await {
                println!(
                    "{}  {}  [{}]  tags: {}",
                    row.id,
                    row.title,
                    if row.is_published { "published" } else { "draft" },
                    row.tags.join(", ")
                );
            }
        }
        Command::Contacts => {
            for row in session.load_contacts().await {
                println!(
                    "{}  {:?}  {} {}  <{}>",
                    row.id, row.status, row.first_name, row.last_name, row.email
                );
            }
        }
        Command::MarkContactRead { id } => {
            session.load_contacts().await;
            session
                .set_contact_status(ContactId(id), ContactStatus::Read)
                .await??;
            println!("marked {id} as read");
        }
        Command::Counts => {
            let counts = session.dashboard_counts().await?;
            println!("contact submissions: {}", counts.contact_submissions);
            println!("testimonials:        {}", counts.testimonials);
            println!("portfolio items:     {}", counts.portfolio_items);
            println!("case studies:        {}", counts.case_studies);
        }
        Command::Deploy => {
            let Some(hook_url) = settings.deploy_hook_url.clone() else {
                bail!("deploy_hook_url is not configured");
            };
            session.trigger_deploy(&hook_url).await?;
            println!("deploy hook triggered; updates appear after the next build");
        }
    }

    Ok(())
}
