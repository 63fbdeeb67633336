use std::path::PathBuf;

use forum_store::{Attachment, Discussion, Forum, Id, Note, Reply, Repository};
use serde_json::json;
use tracing::instrument;

use crate::cli::terminal::Colorize;

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// The forum to display
    forum: Id,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "pretty")]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Pretty,
    Json,
}

impl Command {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let repository = Repository::open(root)?;

        let Some(forum) = repository.store().forum(&self.forum) else {
            anyhow::bail!("Forum {} not found", self.forum);
        };

        match self.output {
            OutputFormat::Pretty => print!("{}", render_pretty(forum)),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&to_json(forum))?),
        }

        Ok(())
    }
}

/// The forum with its posts in display order.
fn to_json(forum: &Forum) -> serde_json::Value {
    json!({
        "id": forum.id,
        "name": forum.name,
        "description": forum.description,
        "tags": forum.tags,
        "rating": forum.rating,
        "notes": forum.notes_by_priority(),
        "discussions": forum.discussions_by_priority(),
    })
}

fn render_pretty(forum: &Forum) -> String {
    let mut out = String::new();

    out.push_str(&format!("# {}\n", forum.name));
    out.push_str(&format!("{}\n\n", forum.description));
    out.push_str(&format!(
        "{}  {}  {}\n",
        format!("★ {}", forum.rating).highlight(),
        forum.tags.join(", ").info(),
        forum.id.as_str().dim()
    ));

    let notes = forum.notes_by_priority();
    if !notes.is_empty() {
        out.push_str(&format!("\n{}\n", "Notes".dim()));
        for note in notes {
            render_note(&mut out, note);
        }
    }

    let discussions = forum.discussions_by_priority();
    if !discussions.is_empty() {
        out.push_str(&format!("\n{}\n", "Discussions".dim()));
        for discussion in discussions {
            render_discussion(&mut out, discussion);
        }
    }

    out
}

fn pin(is_pinned: bool) -> String {
    if is_pinned {
        "📌 ".highlight()
    } else {
        String::new()
    }
}

fn render_note(out: &mut String, note: &Note) {
    out.push_str(&format!(
        "  • {}{} {}\n",
        pin(note.is_pinned),
        note.title,
        format!("({})", note.id).dim()
    ));
    out.push_str(&format!("    {}\n", note.content));
    render_byline(out, &note.author, note.likes, note.dislikes, "    ");
    render_attachments(out, &note.attachments, "    ");
    render_replies(out, &note.replies);
}

fn render_discussion(out: &mut String, discussion: &Discussion) {
    out.push_str(&format!(
        "  • {}{} {}\n",
        pin(discussion.is_pinned),
        discussion.content,
        format!("({})", discussion.id).dim()
    ));

    if let Some(options) = discussion.poll() {
        let total = discussion.total_votes();
        for option in options {
            let share = if total == 0 {
                0.0
            } else {
                f64::from(option.votes) * 100.0 / f64::from(total)
            };
            out.push_str(&format!(
                "    [{:>3.0}%] {} {} {}\n",
                share,
                option.text,
                format!("{} votes", option.votes).dim(),
                format!("({})", option.id).dim()
            ));
        }
    }

    render_byline(
        out,
        &discussion.author,
        discussion.likes,
        discussion.dislikes,
        "    ",
    );
    render_attachments(out, &discussion.attachments, "    ");
    render_replies(out, &discussion.replies);
}

fn render_replies(out: &mut String, replies: &[Reply]) {
    for reply in replies {
        out.push_str(&format!(
            "      ↳ {} {}\n",
            reply.content,
            format!("({})", reply.id).dim()
        ));
        render_byline(out, &reply.author, reply.likes, reply.dislikes, "        ");
        render_attachments(out, &reply.attachments, "        ");
    }
}

fn render_byline(out: &mut String, author: &str, likes: u32, dislikes: u32, indent: &str) {
    out.push_str(&format!(
        "{indent}{}\n",
        format!("by {author}  👍 {likes}  👎 {dislikes}").dim()
    ));
}

fn render_attachments(out: &mut String, attachments: &[Attachment], indent: &str) {
    for attachment in attachments {
        out.push_str(&format!(
            "{indent}📎 {} {}\n",
            attachment.name,
            attachment.url.as_str().info()
        ));
    }
}
