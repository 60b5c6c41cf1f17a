//! Bling API v3 data types.
//!
//! Field names on the wire are Bling's (Portuguese); they are kept on
//! output too, so the storefront sees the same shape Bling returns.

use masterferri_core::{CartItem, CategoryId, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Bling wraps every payload in `{ "data": ... }`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Envelope<T> {
    pub data: T,
}

// =============================================================================
// Enums
// =============================================================================

/// Product kind (`tipo`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductKind {
    #[serde(rename = "P")]
    Product,
    #[serde(rename = "S")]
    Service,
    /// Communication service (Bling's "Serviço 06 21 22").
    #[serde(rename = "N")]
    CommunicationService,
    #[serde(other)]
    Unknown,
}

/// Product status (`situacao`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductStatus {
    #[serde(rename = "A")]
    Active,
    #[serde(rename = "I")]
    Inactive,
    #[serde(other)]
    Unknown,
}

/// Product format (`formato`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductFormat {
    #[serde(rename = "S")]
    Simple,
    #[serde(rename = "V")]
    WithVariations,
    #[serde(rename = "E")]
    WithComposition,
    #[serde(other)]
    Unknown,
}

// =============================================================================
// Nested types
// =============================================================================

/// Stock levels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stock {
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub minimo: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub maximo: Option<Decimal>,
    #[serde(default)]
    pub crossdocking: Option<i64>,
    #[serde(default)]
    pub localizacao: Option<String>,
    /// Stock on hand minus reservations.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub saldo_virtual_total: Option<Decimal>,
}

/// Reference to another entity by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdRef {
    pub id: i64,
}

/// Package dimensions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimensions {
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub largura: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub altura: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub profundidade: Option<Decimal>,
    #[serde(default)]
    pub unidade_medida: Option<u8>,
}

/// Image hosted outside Bling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalImage {
    pub link: String,
}

/// Image uploaded to Bling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalImage {
    pub link: String,
    #[serde(default)]
    pub link_miniatura: Option<String>,
    #[serde(default)]
    pub validade: Option<String>,
    #[serde(default)]
    pub ordem: Option<i64>,
}

/// Product images.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Images {
    #[serde(default)]
    pub externas: Vec<ExternalImage>,
    #[serde(default)]
    pub internas: Vec<InternalImage>,
}

/// Product video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    #[serde(default)]
    pub url: String,
}

/// Product media.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    #[serde(default)]
    pub video: Option<Video>,
    #[serde(default)]
    pub imagens: Images,
}

/// Variation attributes of a child product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariationInfo {
    pub nome: String,
    #[serde(default)]
    pub ordem: Option<i64>,
}

/// A variation of a product with format `V`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variation {
    #[serde(default)]
    pub id: Option<i64>,
    pub nome: String,
    #[serde(default)]
    pub codigo: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub preco: Option<Decimal>,
    #[serde(default)]
    pub estoque: Option<Stock>,
    #[serde(default)]
    pub variacao: Option<VariationInfo>,
}

// =============================================================================
// Products
// =============================================================================

/// Product as returned by `GET /produtos` (list form).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_produto_pai: Option<i64>,
    pub nome: String,
    #[serde(default)]
    pub codigo: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub preco: Decimal,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub preco_custo: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estoque: Option<Stock>,
    pub tipo: ProductKind,
    pub situacao: ProductStatus,
    pub formato: ProductFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descricao_curta: Option<String>,
    #[serde(
        rename = "imagemURL",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub imagem_url: Option<String>,
}

impl ProductSummary {
    /// Typed product id.
    #[must_use]
    pub const fn product_id(&self) -> ProductId {
        ProductId::new(self.id)
    }

    /// True if virtual stock is positive.
    #[must_use]
    pub fn in_stock(&self) -> bool {
        in_stock(self.estoque.as_ref())
    }
}

impl From<&ProductSummary> for CartItem {
    fn from(product: &ProductSummary) -> Self {
        Self {
            id: product.product_id(),
            name: product.nome.clone(),
            price: product.preco,
            image: product.imagem_url.clone().filter(|u| !u.is_empty()),
            quantity: 1,
            code: product.codigo.clone(),
            description: product.descricao_curta.clone().unwrap_or_default(),
        }
    }
}

/// Product as returned by `GET /produtos/{id}` (detail form).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    pub id: i64,
    pub nome: String,
    #[serde(default)]
    pub codigo: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub preco: Option<Decimal>,
    pub tipo: ProductKind,
    #[serde(default)]
    pub situacao: Option<ProductStatus>,
    pub formato: ProductFormat,
    #[serde(default)]
    pub descricao_curta: Option<String>,
    #[serde(rename = "imagemURL", default)]
    pub imagem_url: Option<String>,
    #[serde(default)]
    pub unidade: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub peso_liquido: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub peso_bruto: Option<Decimal>,
    #[serde(default)]
    pub volumes: Option<i64>,
    #[serde(default)]
    pub itens_por_caixa: Option<i64>,
    #[serde(default)]
    pub gtin: Option<String>,
    #[serde(default)]
    pub marca: Option<String>,
    #[serde(default)]
    pub descricao_complementar: Option<String>,
    #[serde(default)]
    pub link_externo: Option<String>,
    #[serde(default)]
    pub observacoes: Option<String>,
    #[serde(default)]
    pub categoria: Option<IdRef>,
    #[serde(default)]
    pub estoque: Option<Stock>,
    #[serde(default)]
    pub dimensoes: Option<Dimensions>,
    #[serde(default)]
    pub midia: Option<Media>,
    #[serde(default)]
    pub variacoes: Vec<Variation>,
}

impl ProductDetail {
    /// True if virtual stock is positive.
    #[must_use]
    pub fn in_stock(&self) -> bool {
        in_stock(self.estoque.as_ref())
    }

    /// Category id, if the product is categorized.
    #[must_use]
    pub fn category_id(&self) -> Option<CategoryId> {
        self.categoria
            .filter(|c| c.id > 0)
            .map(|c| CategoryId::new(c.id))
    }

    /// Main image: `imagemURL`, else the first external image, else the
    /// first internal one.
    #[must_use]
    pub fn main_image(&self) -> Option<&str> {
        let images = self.midia.as_ref().map(|m| &m.imagens);
        self.imagem_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .or_else(|| images.and_then(|i| i.externas.first()).map(|i| i.link.as_str()))
            .or_else(|| images.and_then(|i| i.internas.first()).map(|i| i.link.as_str()))
    }

    /// Every image link, external ones first.
    #[must_use]
    pub fn gallery(&self) -> Vec<&str> {
        self.midia.as_ref().map_or_else(Vec::new, |m| {
            m.imagens
                .externas
                .iter()
                .map(|i| i.link.as_str())
                .chain(m.imagens.internas.iter().map(|i| i.link.as_str()))
                .collect()
        })
    }
}

fn in_stock(stock: Option<&Stock>) -> bool {
    stock
        .and_then(|s| s.saldo_virtual_total)
        .is_some_and(|qty| qty > Decimal::ZERO)
}

// =============================================================================
// Categories
// =============================================================================

/// Product category from `GET /categorias/produtos`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub descricao: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categoria_pai: Option<IdRef>,
}

impl Category {
    /// Parent category id; Bling reports `0` for top-level categories.
    #[must_use]
    pub fn parent_id(&self) -> Option<CategoryId> {
        self.categoria_pai
            .filter(|p| p.id > 0)
            .map(|p| CategoryId::new(p.id))
    }
}
