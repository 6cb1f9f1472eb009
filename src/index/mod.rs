//! 索引模块

pub mod embedding;
pub mod vector;

pub use embedding::{EmbeddingModel, HashingEmbeddingModel, create_embedding_model};
pub use vector::{FlatIndex, SearchHits};

use std::sync::Arc;

use tracing::info;

use crate::error::Result;
use crate::models::Fragment;

/// 启动时构建一次的检索知识库
///
/// 持有片段、对应的向量索引以及构建索引所用的嵌入模型。
/// 查询必须通过 [`KnowledgeBase::embedding_model`] 编码，保证与语料处于同一向量空间。
pub struct KnowledgeBase {
    fragments: Vec<Fragment>,
    index: FlatIndex,
    embedding_model: Arc<dyn EmbeddingModel>,
}

impl KnowledgeBase {
    pub async fn build(
        fragments: Vec<Fragment>,
        embedding_model: Arc<dyn EmbeddingModel>,
    ) -> Result<Self> {
        let index = FlatIndex::build(&fragments, embedding_model.as_ref()).await?;
        info!("Knowledge base ready with {} fragments", fragments.len());

        Ok(Self {
            fragments,
            index,
            embedding_model,
        })
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn fragment(&self, position: usize) -> Option<&Fragment> {
        self.fragments.get(position)
    }

    pub fn index(&self) -> &FlatIndex {
        &self.index
    }

    pub fn embedding_model(&self) -> &dyn EmbeddingModel {
        self.embedding_model.as_ref()
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}
