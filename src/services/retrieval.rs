//! 检索服务

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::index::KnowledgeBase;

/// 片段之间的分隔符
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// 单条检索命中
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedFragment {
    pub position: usize,
    pub distance: f32,
    pub text: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RetrievalService: Send + Sync {
    /// 返回与查询最接近的 `top_k` 个片段，按距离升序
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<RetrievedFragment>>;

    /// 检索并拼接为提示词上下文；无命中时返回空字符串
    async fn retrieve_context(&self, query: &str, top_k: usize) -> Result<String> {
        let fragments = self.retrieve(query, top_k).await?;
        Ok(fragments
            .into_iter()
            .map(|f| f.text)
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR))
    }
}

pub struct RetrievalServiceImpl {
    knowledge_base: Arc<KnowledgeBase>,
}

impl RetrievalServiceImpl {
    pub fn new(knowledge_base: Arc<KnowledgeBase>) -> Self {
        Self { knowledge_base }
    }
}

#[async_trait]
impl RetrievalService for RetrievalServiceImpl {
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<RetrievedFragment>> {
        let kb = &self.knowledge_base;
        if kb.is_empty() {
            return Ok(Vec::new());
        }

        let query_embedding = kb.embedding_model().encode(query).await?;
        let hits = kb.index().search(&query_embedding, top_k)?;

        // 越界的行号直接跳过
        let results: Vec<RetrievedFragment> = hits
            .iter()
            .filter_map(|(distance, position)| {
                kb.fragment(position).map(|fragment| RetrievedFragment {
                    position,
                    distance,
                    text: fragment.text.clone(),
                })
            })
            .collect();

        debug!(
            top_k,
            hits = results.len(),
            best_distance = results.first().map(|r| r.distance),
            "Context retrieved"
        );

        Ok(results)
    }
}

pub fn create_retrieval_service(knowledge_base: Arc<KnowledgeBase>) -> Box<dyn RetrievalService> {
    Box::new(RetrievalServiceImpl::new(knowledge_base))
}
