//! Internal knowledge base search over a directory of text and markdown files.
//!
//! Files are split into paragraph chunks at load time; a query scores each
//! chunk by how many of its keywords the chunk contains.

use crate::http::required_str;
use async_trait::async_trait;
use concierge_core::error::ToolError;
use concierge_core::tool::{Tool, ToolContext, ToolResult};
use std::fmt::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

const EXTENSIONS: [&str; 3] = ["txt", "md", "markdown"];
const MAX_CHUNK_CHARS: usize = 1200;

#[derive(Debug, Clone)]
pub struct Chunk {
    pub source: String,
    pub content: String,
}

/// An in-memory, read-only document index.
#[derive(Debug, Default)]
pub struct KnowledgeBase {
    chunks: Vec<Chunk>,
}

impl KnowledgeBase {
    /// Load every text/markdown file directly under `dir`.
    pub fn load(dir: &Path) -> std::io::Result<Self> {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| EXTENSIONS.contains(&e.to_lowercase().as_str()))
            })
            .collect();
        paths.sort();

        let mut kb = Self::default();
        for path in paths {
            match std::fs::read_to_string(&path) {
                Ok(body) => {
                    let source = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    kb.add_document(&source, &body);
                }
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable document"),
            }
        }

        info!(dir = %dir.display(), chunks = kb.chunks.len(), "Knowledge base loaded");
        Ok(kb)
    }

    pub fn add_document(&mut self, source: &str, body: &str) {
        for paragraph in body.split("\n\n") {
            let paragraph = paragraph.trim();
            if paragraph.is_empty() {
                continue;
            }
            let mut current = String::new();
            for line in paragraph.lines() {
                if !current.is_empty() && current.len() + line.len() + 1 > MAX_CHUNK_CHARS {
                    self.push(source, std::mem::take(&mut current));
                }
                if !current.is_empty() {
                    current.push('\n');
                }
                current.push_str(line.trim_end());
            }
            self.push(source, current);
        }
    }

    fn push(&mut self, source: &str, content: String) {
        if !content.trim().is_empty() {
            self.chunks.push(Chunk {
                source: source.to_string(),
                content,
            });
        }
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Best-matching chunks, highest score first.
    pub fn search(&self, query: &str, top_k: usize) -> Vec<(f32, &Chunk)> {
        let terms: Vec<String> = query
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.len() > 2)
            .map(str::to_lowercase)
            .collect();
        if terms.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(f32, &Chunk)> = self
            .chunks
            .iter()
            .filter_map(|chunk| {
                let content = chunk.content.to_lowercase();
                let hits = terms.iter().filter(|t| content.contains(t.as_str())).count();
                (hits > 0).then(|| (hits as f32 / terms.len() as f32, chunk))
            })
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        scored
    }
}

pub struct DatabaseSearchTool {
    kb: Option<Arc<KnowledgeBase>>,
}

impl DatabaseSearchTool {
    pub fn new(kb: Option<Arc<KnowledgeBase>>) -> Self {
        Self { kb }
    }
}

#[async_trait]
impl Tool for DatabaseSearchTool {
    fn name(&self) -> &str {
        "database_search"
    }

    fn description(&self) -> &str {
        "Search internal documents, manuals, and the company knowledge base. Returns the most relevant passages with their source file."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "What to look for in the knowledge base"
                },
                "top_k": {
                    "type": "integer",
                    "description": "Maximum number of passages to return (default 3)",
                    "default": 3
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        _ctx: &ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let query = required_str(&arguments, "query")?;
        let top_k = arguments["top_k"].as_u64().unwrap_or(3).clamp(1, 10) as usize;

        let kb = self.kb.as_ref().ok_or_else(|| ToolError::ExecutionFailed {
            tool_name: self.name().into(),
            reason: "knowledge base is not configured (set tools.knowledge_dir)".into(),
        })?;

        let hits = kb.search(query, top_k);
        if hits.is_empty() {
            return Ok(ToolResult::ok(format!(
                "No matching documents found for '{query}'."
            )));
        }

        let mut out = String::new();
        for (idx, (score, chunk)) in hits.iter().enumerate() {
            let _ = writeln!(out, "{}. [{}] (relevance {:.2})", idx + 1, chunk.source, score);
            let _ = writeln!(out, "{}\n", chunk.content);
        }
        Ok(ToolResult::ok(out.trim_end()))
    }
}
