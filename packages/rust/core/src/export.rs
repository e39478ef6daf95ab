//! Markdown export of a finished pitch.

use std::fmt::Write as _;
use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::{info, instrument};

use pitchcraft_shared::{PitchArtifact, PitchcraftError, Result};

fn bullet_list(out: &mut String, items: &[String]) {
    for item in items {
        let _ = writeln!(out, "- {item}");
    }
}

/// Render the artifact as a standalone Markdown document.
pub fn render_markdown(artifact: &PitchArtifact) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "# {}\n", artifact.idea);
    let _ = writeln!(
        out,
        "_Generated {} · language `{}` · id `{}`_\n",
        artifact.generated_at.format("%Y-%m-%d %H:%M UTC"),
        artifact.language,
        artifact.id
    );

    let _ = writeln!(out, "## Executive Summary\n\n{}\n", artifact.executive_summary);

    for (i, slide) in artifact.slides.iter().enumerate() {
        let _ = writeln!(out, "## {}. {}\n\n{}\n", i + 1, slide.title, slide.content.trim());
    }

    let research = &artifact.research;
    out.push_str("## Market Research\n\n");
    let _ = writeln!(out, "**Market size:** {}\n", research.market_size);
    out.push_str("**Competitors:**\n\n");
    bullet_list(&mut out, &research.competitors);
    out.push_str("\n**Trends:**\n\n");
    bullet_list(&mut out, &research.trends);
    let _ = writeln!(out, "\n**Funding:** {}\n", research.funding);
    out.push_str("**Sources:**\n\n");
    bullet_list(&mut out, &research.sources);

    let analysis = &artifact.analysis;
    out.push_str("\n## Analysis\n\n");
    let _ = writeln!(out, "**Quality score:** {:.1} / 10\n", analysis.quality.score);
    let _ = writeln!(out, "{}\n", analysis.quality.feedback);
    if !analysis.quality.suggestions.is_empty() {
        out.push_str("**Suggestions:**\n\n");
        bullet_list(&mut out, &analysis.quality.suggestions);
        out.push('\n');
    }
    let language = &analysis.language;
    let _ = writeln!(
        out,
        "| Words | Sentences | Readability | Engagement | Processing |\n\
         |---|---|---|---|---|\n\
         | {} | {} | {:.1} | {:.1} | {} ms |",
        language.word_count,
        language.sentence_count,
        language.readability,
        language.engagement,
        analysis.processing_time_ms
    );

    out
}

/// Write the rendered document atomically and return its SHA-256.
#[instrument(skip_all, fields(id = %artifact.id, path = %path.display()))]
pub fn write_markdown(path: &Path, artifact: &PitchArtifact) -> Result<String> {
    let content = render_markdown(artifact);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| PitchcraftError::io(parent, e))?;
    }

    let file_name = path
        .file_name()
        .ok_or_else(|| PitchcraftError::invalid_input("export path has no file name"))?
        .to_string_lossy();
    let temp = path.with_file_name(format!(".{file_name}.tmp"));

    std::fs::write(&temp, &content).map_err(|e| PitchcraftError::io(&temp, e))?;
    std::fs::rename(&temp, path).map_err(|e| PitchcraftError::io(path, e))?;

    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let hash = format!("{:x}", hasher.finalize());

    info!(bytes = content.len(), sha256 = %hash, "exported pitch");
    Ok(hash)
}
