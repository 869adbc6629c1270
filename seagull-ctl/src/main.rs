use std::{
    io::{self, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;
use seagull_client::{
    api::{self, Action, CommentId, PostId, UserId},
    CommentForest, CommentNode,
};

#[derive(structopt::StructOpt)]
struct Opt {
    /// JSON file holding the thread, as the backend lists it
    #[structopt(short, long, env = "SEAGULL_THREAD", parse(from_os_str))]
    thread: PathBuf,

    /// Post the thread belongs to
    #[structopt(short, long)]
    post: i64,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(structopt::StructOpt)]
enum Command {
    /// Print the thread, replies indented under their parent
    Show,

    /// Add a comment the backend created
    Reply {
        /// Comment this replies to, top-level if absent
        #[structopt(long)]
        parent: Option<i64>,

        /// Id the backend assigned
        #[structopt(long)]
        id: i64,

        #[structopt(long)]
        author: i64,

        content: String,
    },

    /// Replace the content of a comment
    Edit { id: i64, content: String },

    /// Delete a comment and all its replies
    Delete { id: i64 },

    /// Apply a JSON list of actions, in order
    Apply {
        #[structopt(parse(from_os_str))]
        actions: PathBuf,
    },
}

fn load(path: &Path, post: PostId) -> anyhow::Result<CommentForest> {
    if !path.exists() {
        tracing::info!(?path, "thread file does not exist yet, starting an empty thread");
        return Ok(CommentForest::new(post));
    }
    let data =
        std::fs::read(path).with_context(|| format!("reading thread file {path:?}"))?;
    let comments: Vec<api::Comment> = serde_json::from_slice(&data)
        .with_context(|| format!("parsing thread file {path:?}"))?;
    CommentForest::from_api(post, comments)
        .with_context(|| format!("loading thread from {path:?}"))
}

fn save(path: &Path, forest: &CommentForest) -> anyhow::Result<()> {
    let data = serde_json::to_vec_pretty(&forest.to_api()).context("serializing thread")?;
    std::fs::write(path, data).with_context(|| format!("writing thread file {path:?}"))
}

fn show(forest: &CommentForest, out: &mut dyn Write) -> anyhow::Result<()> {
    writeln!(out, "{} comments", forest.len())?;
    for (depth, c) in forest.walk() {
        let indent = "  ".repeat(depth);
        writeln!(
            out,
            "{indent}#{} by user {} on {}",
            c.id.0,
            c.author_id.0,
            c.created_at.format("%Y-%m-%d %H:%M")
        )?;
        for line in c.content.lines() {
            writeln!(out, "{indent}  {line}")?;
        }
    }
    Ok(())
}

fn run(opt: Opt, out: &mut dyn Write) -> anyhow::Result<()> {
    let post = PostId(opt.post);
    let forest = load(&opt.thread, post)?;
    let forest = match opt.cmd {
        Command::Show => return show(&forest, out),
        Command::Reply {
            parent,
            id,
            author,
            content,
        } => {
            let parent = parent.map(CommentId);
            if let Some(p) = parent.filter(|p| !forest.contains(*p)) {
                tracing::warn!(parent = ?p, "parent comment not in thread, reply ignored");
            }
            let node = CommentNode::new(
                CommentId(id),
                post,
                UserId(author),
                chrono::Utc::now(),
                content,
            );
            forest
                .insert_reply(parent, node)
                .with_context(|| format!("adding comment {id}"))?
        }
        Command::Edit { id, content } => forest.update_content(CommentId(id), &content),
        Command::Delete { id } => forest.remove_subtree(CommentId(id)),
        Command::Apply { actions } => {
            let data = std::fs::read(&actions)
                .with_context(|| format!("reading actions file {actions:?}"))?;
            let actions: Vec<Action> =
                serde_json::from_slice(&data).context("parsing actions file")?;
            let mut forest = forest;
            for (i, a) in actions.iter().enumerate() {
                forest = forest
                    .apply(a)
                    .with_context(|| format!("applying action {i}: {a:?}"))?;
            }
            forest
        }
    };
    save(&opt.thread, &forest)?;
    writeln!(out, "{} comments", forest.len())?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let opt = <Opt as structopt::StructOpt>::from_args();
    run(opt, &mut io::stdout().lock())
}
