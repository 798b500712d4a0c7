//! Whole-patch rewriting: every line through the line rewriter, in order.

use std::path::Path;

use crate::error::{RepackageError, Result};
use crate::mapping::RuleSet;
use crate::rewrite::rewrite_line;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemappedPatch {
    pub content: String,
    pub line_count: usize,
    pub rewritten_lines: usize,
}

#[derive(Debug, Clone)]
pub struct PatchRemapper {
    rules: RuleSet,
}

impl PatchRemapper {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Rewrites every line in order and joins them with `\n`, always ending
    /// with a single trailing newline.
    pub fn remap_text(&self, text: &str) -> RemappedPatch {
        let mut content = String::with_capacity(text.len() + 1);
        let mut line_count = 0usize;
        let mut rewritten_lines = 0usize;

        for line in text.lines() {
            if line_count > 0 {
                content.push('\n');
            }
            let out = rewrite_line(line, &self.rules);
            if out != line {
                rewritten_lines += 1;
            }
            content.push_str(&out);
            line_count += 1;
        }
        content.push('\n');

        RemappedPatch {
            content,
            line_count,
            rewritten_lines,
        }
    }

    pub fn remap_file(&self, path: &Path) -> Result<RemappedPatch> {
        let text =
            std::fs::read_to_string(path).map_err(|source| RepackageError::FileReadFailed {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(self.remap_text(&text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{RemapConfig, parse_mappings};

    const PATCH: &str = "\
From 0000000000000000000000000000000000000000 Mon Sep 17 00:00:00 2001
Subject: [PATCH] Tick worlds

diff --git a/src/main/java/net/minecraft/server/WorldServer.java b/src/main/java/net/minecraft/server/WorldServer.java
index 1111111..2222222 100644
--- a/src/main/java/net/minecraft/server/WorldServer.java
+++ b/src/main/java/net/minecraft/server/WorldServer.java
@@ -1,4 +1,5 @@
 package net.minecraft.server;
-import net.minecraft.server.Entity;
+import net.minecraft.server.Entity;
+import net.minecraft.server.WorldServer;

";

    fn remapper() -> PatchRemapper {
        let rules = parse_mappings(
            "a net/minecraft/server/level/WorldServer\nb net/minecraft/world/entity/Entity",
            &RemapConfig::default(),
        )
        .unwrap();
        PatchRemapper::new(rules)
    }

    #[test]
    fn remap_text_rewrites_headers_and_additions_only() {
        let out = remapper().remap_text(PATCH);
        let lines: Vec<&str> = out.content.lines().collect();

        assert_eq!(
            lines[3],
            "diff --git a/src/main/java/net/minecraft/server/level/WorldServer.java b/src/main/java/net/minecraft/server/level/WorldServer.java"
        );
        assert_eq!(lines[5], "--- a/src/main/java/net/minecraft/server/level/WorldServer.java");
        assert_eq!(lines[6], "+++ b/src/main/java/net/minecraft/server/level/WorldServer.java");
        assert_eq!(lines[8], " package net.minecraft.server;");
        assert_eq!(lines[9], "-import net.minecraft.server.Entity;");
        assert_eq!(lines[10], "+import net.minecraft.world.entity.Entity;");
        assert_eq!(lines[11], "+import net.minecraft.server.level.WorldServer;");
        assert_eq!(out.rewritten_lines, 5);
    }

    #[test]
    fn line_count_is_preserved() {
        let out = remapper().remap_text(PATCH);
        assert_eq!(out.line_count, PATCH.lines().count());
        assert_eq!(out.content.lines().count(), out.line_count);
    }

    #[test]
    fn output_always_ends_with_exactly_one_newline() {
        let remapper = remapper();
        assert_eq!(remapper.remap_text("a\nb").content, "a\nb\n");
        assert_eq!(remapper.remap_text("a\nb\n").content, "a\nb\n");
        assert_eq!(remapper.remap_text("a\r\nb\r\n").content, "a\nb\n");
        assert_eq!(remapper.remap_text("").content, "\n");
    }

    #[test]
    fn remap_file_reports_missing_path() {
        let missing = std::env::temp_dir().join(format!(
            "patch_repackage_missing_{}.patch",
            std::process::id()
        ));
        let err = remapper().remap_file(&missing).unwrap_err();
        assert!(matches!(err, RepackageError::FileReadFailed { ref path, .. } if *path == missing));
    }
}
