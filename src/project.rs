//! 项目路由 - Sentry project slug 到 Telegram chat 的静态映射
//!
//! 映射在启动时从 JSON 文件加载一次，之后只读。
//! 文件中的第一个项目是默认（fallback）目的地。

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use tracing::{info, warn};

use crate::notification::sanitizer::escape_html;

/// 单个项目的路由信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectEntry {
    pub slug: String,
    pub chat_id: String,
    /// 监控告警时 @ 的开发者
    pub developers: Vec<String>,
}

/// 项目文件中每个 slug 对应的值
#[derive(Debug, Deserialize)]
struct RawProjectEntry {
    #[serde(alias = "chatId")]
    chat_id: serde_json::Value,
    #[serde(default)]
    developers: Vec<String>,
}

/// 有序、只读的项目映射
#[derive(Debug, Clone)]
pub struct ProjectMap {
    entries: Vec<ProjectEntry>,
}

impl ProjectMap {
    /// 直接从条目构建，第一个条目作为 fallback，必须有 chat_id
    pub fn new(entries: Vec<ProjectEntry>) -> Result<Self> {
        let Some(fallback) = entries.first() else {
            return Err(anyhow!("项目映射为空，至少需要一个默认项目"));
        };
        if fallback.chat_id.is_empty() {
            return Err(anyhow!("默认项目 {} 缺少 chat_id", fallback.slug));
        }
        Ok(Self { entries })
    }

    /// 解析 JSON 对象：`{"slug": {"chat_id": "...", "developers": ["@a"]}}`
    pub fn from_json(content: &str) -> Result<Self> {
        let raw: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(content).context("项目映射必须是 JSON 对象")?;

        let mut entries = Vec::with_capacity(raw.len());
        for (slug, value) in raw {
            let parsed: RawProjectEntry = serde_json::from_value(value)
                .with_context(|| format!("项目 {} 配置无效", slug))?;
            let chat_id = match parsed.chat_id {
                serde_json::Value::String(s) => s,
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Null => String::new(),
                other => return Err(anyhow!("项目 {} 的 chat_id 类型无效: {}", slug, other)),
            };
            if chat_id.is_empty() {
                warn!(project = %slug, "Project has no chat_id, alerts will use the fallback chat");
            }
            entries.push(ProjectEntry {
                slug,
                chat_id,
                developers: parsed.developers,
            });
        }

        Self::new(entries)
    }

    /// 从文件加载
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("无法读取项目映射文件: {}", path.display()))?;
        let map = Self::from_json(&content)
            .with_context(|| format!("无法解析项目映射文件: {}", path.display()))?;
        info!(
            path = %path.display(),
            projects = map.len(),
            fallback = %map.fallback().slug,
            "Loaded project map"
        );
        Ok(map)
    }

    pub fn get(&self, slug: &str) -> Option<&ProjectEntry> {
        self.entries.iter().find(|entry| entry.slug == slug)
    }

    /// 第一个条目
    pub fn fallback(&self) -> &ProjectEntry {
        &self.entries[0]
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProjectEntry> {
        self.entries.iter()
    }
}

/// 路由结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route<'a> {
    /// 找到项目
    Project(&'a ProjectEntry),
    /// 找不到项目或项目没有 chat_id，发往默认项目
    Fallback {
        entry: &'a ProjectEntry,
        missing: String,
    },
}

impl Route<'_> {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Route::Fallback { .. })
    }
}

/// 项目路由器
#[derive(Debug, Clone)]
pub struct ProjectRouter {
    projects: ProjectMap,
}

impl ProjectRouter {
    pub fn new(projects: ProjectMap) -> Self {
        Self { projects }
    }

    /// 解析 project slug，未知或缺失时返回 fallback
    pub fn resolve(&self, slug: Option<&str>) -> Route<'_> {
        match slug.and_then(|s| self.projects.get(s)) {
            Some(entry) if !entry.chat_id.is_empty() => Route::Project(entry),
            _ => Route::Fallback {
                entry: self.projects.fallback(),
                missing: slug.unwrap_or_default().to_string(),
            },
        }
    }

    /// 默认目的地
    pub fn fallback(&self) -> &ProjectEntry {
        self.projects.fallback()
    }
}

/// 找不到项目时发往默认 chat 的诊断消息
pub fn missing_project_message(slug: &str) -> String {
    format!("Can't find chat ID for project {}", escape_html(slug))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PROJECTS: &str = r#"{
        "web-frontend": {"chat_id": "-1001", "developers": ["@alice", "@bob"]},
        "api": {"chatId": -1002},
        "mobile": {"chat_id": ""}
    }"#;

    fn router() -> ProjectRouter {
        ProjectRouter::new(ProjectMap::from_json(PROJECTS).unwrap())
    }

    #[test]
    fn test_parse_preserves_order() {
        let map = ProjectMap::from_json(PROJECTS).unwrap();
        let slugs: Vec<&str> = map.iter().map(|e| e.slug.as_str()).collect();
        assert_eq!(slugs, vec!["web-frontend", "api", "mobile"]);
        assert_eq!(map.fallback().slug, "web-frontend");
    }

    #[test]
    fn test_chat_id_alias_and_number() {
        let map = ProjectMap::from_json(PROJECTS).unwrap();
        let api = map.get("api").unwrap();
        assert_eq!(api.chat_id, "-1002");
        assert!(api.developers.is_empty());
    }

    #[test]
    fn test_empty_map_rejected() {
        assert!(ProjectMap::from_json("{}").is_err());
        assert!(ProjectMap::new(Vec::new()).is_err());
    }

    #[test]
    fn test_fallback_without_chat_id_rejected() {
        assert!(ProjectMap::from_json(r#"{"ops": {"chat_id": ""}, "web": {"chat_id": "-1"}}"#).is_err());
        assert!(ProjectMap::from_json(r#"{"ops": {"chat_id": null}}"#).is_err());

        let entry = |slug: &str, chat_id: &str| ProjectEntry {
            slug: slug.to_string(),
            chat_id: chat_id.to_string(),
            developers: Vec::new(),
        };
        assert!(ProjectMap::new(vec![entry("ops", ""), entry("web", "-1")]).is_err());
        // 只有默认项目必须有 chat_id
        assert!(ProjectMap::new(vec![entry("ops", "-1"), entry("web", "")]).is_ok());
    }

    #[test]
    fn test_invalid_json_rejected() {
        assert!(ProjectMap::from_json("[]").is_err());
        assert!(ProjectMap::from_json(r#"{"a": {"developers": []}}"#).is_err());
        assert!(ProjectMap::from_json(r#"{"a": {"chat_id": true}}"#).is_err());
    }

    #[test]
    fn test_resolve_known_project() {
        let router = router();
        match router.resolve(Some("web-frontend")) {
            Route::Project(entry) => {
                assert_eq!(entry.chat_id, "-1001");
                assert_eq!(entry.developers, vec!["@alice", "@bob"]);
            }
            Route::Fallback { .. } => panic!("expected project"),
        }
    }

    #[test]
    fn test_resolve_unknown_project_falls_back() {
        let router = router();
        let route = router.resolve(Some("unknown"));
        match route {
            Route::Fallback { entry, missing } => {
                assert_eq!(entry.slug, "web-frontend");
                assert_eq!(entry.chat_id, "-1001");
                assert_eq!(entry.developers, vec!["@alice", "@bob"]);
                assert_eq!(missing, "unknown");
            }
            Route::Project(_) => panic!("expected fallback"),
        }
    }

    #[test]
    fn test_resolve_missing_slug_and_empty_chat() {
        let router = router();
        assert!(router.resolve(None).is_fallback());
        assert!(router.resolve(Some("mobile")).is_fallback());
    }

    #[test]
    fn test_missing_project_message_escapes_slug() {
        assert_eq!(
            missing_project_message("a<b>"),
            "Can't find chat ID for project a&lt;b&gt;"
        );
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(PROJECTS.as_bytes()).unwrap();

        let map = ProjectMap::load(file.path()).unwrap();
        assert_eq!(map.len(), 3);
        assert!(ProjectMap::load(Path::new("/nonexistent/projects.json")).is_err());
    }
}
