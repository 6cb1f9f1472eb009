//! 向量索引服务

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{AppError, Result};
use crate::index::embedding::EmbeddingModel;
use crate::models::Fragment;

/// 检索结果：按距离升序排列的 (距离, 行号)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchHits {
    pub distances: Vec<f32>,
    pub indices: Vec<usize>,
}

impl SearchHits {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (f32, usize)> + '_ {
        self.distances
            .iter()
            .copied()
            .zip(self.indices.iter().copied())
    }
}

/// 平坦（精确）向量索引，度量为欧氏距离的平方
///
/// 构建后不可变，第 i 行对应第 i 个片段。
#[derive(Debug, Clone)]
pub struct FlatIndex {
    dimension: usize,
    vectors: Vec<Vec<f32>>,
}

impl FlatIndex {
    /// 以一次批量调用编码全部片段并建立索引
    ///
    /// 维度取自第一个向量；语料为空时使用模型声明的维度。
    pub async fn build(fragments: &[Fragment], model: &dyn EmbeddingModel) -> Result<Self> {
        let texts: Vec<&str> = fragments.iter().map(|f| f.text.as_str()).collect();
        let vectors = if texts.is_empty() {
            Vec::new()
        } else {
            model.encode_batch(&texts).await?
        };

        if vectors.len() != fragments.len() {
            return Err(AppError::VectorIndex(format!(
                "embedding batch returned {} vectors for {} fragments",
                vectors.len(),
                fragments.len()
            )));
        }

        let dimension = vectors
            .first()
            .map(Vec::len)
            .unwrap_or_else(|| model.dimension());

        let index = Self::from_vectors(dimension, vectors)?;
        info!(
            "Flat index built: {} vectors, dimension {}",
            index.len(),
            index.dimension
        );
        Ok(index)
    }

    /// 由现成的向量构建索引
    pub fn from_vectors(dimension: usize, vectors: Vec<Vec<f32>>) -> Result<Self> {
        if dimension == 0 && !vectors.is_empty() {
            return Err(AppError::VectorIndex(
                "embedding dimension must be greater than 0".to_string(),
            ));
        }

        if let Some((row, v)) = vectors
            .iter()
            .enumerate()
            .find(|(_, v)| v.len() != dimension)
        {
            return Err(AppError::VectorIndex(format!(
                "vector {} has dimension {}, expected {}",
                row,
                v.len(),
                dimension
            )));
        }

        Ok(Self { dimension, vectors })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// 返回距离最近的 `k` 个向量；`k` 超过索引大小时返回全部
    ///
    /// 距离相同时行号小者优先。
    pub fn search(&self, query: &[f32], k: usize) -> Result<SearchHits> {
        if self.vectors.is_empty() || k == 0 {
            return Ok(SearchHits::default());
        }

        if query.len() != self.dimension {
            return Err(AppError::VectorIndex(format!(
                "query has dimension {}, index expects {}",
                query.len(),
                self.dimension
            )));
        }

        let mut scored: Vec<(f32, usize)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(i, v)| (Self::squared_l2(query, v), i))
            .collect();

        scored.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        scored.truncate(k);

        let (distances, indices) = scored.into_iter().unzip();
        Ok(SearchHits { distances, indices })
    }

    fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| {
                let d = x - y;
                d * d
            })
            .sum()
    }
}
