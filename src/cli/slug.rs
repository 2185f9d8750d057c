//! `blogsync slug`: print a title's slug.

use crate::slug::slugify;

pub fn run(title: &str) -> anyhow::Result<()> {
    let slug = slugify(title);
    if slug.is_empty() {
        anyhow::bail!("Title {title:?} yields an empty slug");
    }
    println!("{slug}");
    Ok(())
}
