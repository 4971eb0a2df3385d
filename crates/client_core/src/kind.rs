//! Entity-kind descriptors: everything the generic controller needs to know
//! about brands, models and products.

use std::fmt;

use serde::{de::DeserializeOwned, Serialize};
use shared::domain::{
    Brand, BrandId, BrandPatch, Model, ModelId, ModelPatch, NewBrand, NewModel, NewProduct,
    Product, ProductId, ProductPatch,
};

pub trait EntityKind: Send + Sync + 'static {
    type Id: Copy + Eq + fmt::Debug + fmt::Display + From<i64> + Into<i64> + Send + Sync;
    type Entity: Clone + fmt::Debug + PartialEq + DeserializeOwned + Send + Sync;
    type Draft: Clone + fmt::Debug + Default + PartialEq + Serialize + Send + Sync;
    type Patch: Clone + fmt::Debug + Default + PartialEq + Serialize + Send + Sync;

    /// Singular, lower-case name used in messages ("brand").
    const NAME: &'static str;
    /// Path segment of the remote collection ("brands").
    const COLLECTION: &'static str;

    fn id(entity: &Self::Entity) -> Option<Self::Id>;

    /// Ordering key for the cached list; records without an id sort as 0.
    fn sort_key(entity: &Self::Entity) -> i64 {
        Self::id(entity).map(Into::into).unwrap_or(0)
    }

    fn validate_draft(draft: &Self::Draft) -> Result<(), String>;

    /// Whether `existing` carries the same comparable fields as `draft`.
    fn is_duplicate(existing: &Self::Entity, draft: &Self::Draft) -> bool;

    /// Drops fields that would only submit blank text.
    fn prune_patch(patch: Self::Patch) -> Self::Patch;

    fn patch_is_empty(patch: &Self::Patch) -> bool;

    fn columns() -> &'static [&'static str];

    fn row(entity: &Self::Entity) -> Vec<String>;

    fn summary(entity: &Self::Entity) -> String;
}

pub(crate) fn is_positive<I: Into<i64>>(id: I) -> bool {
    id.into() > 0
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn display_id<I: fmt::Display>(id: Option<I>) -> String {
    id.map(|id| id.to_string()).unwrap_or_default()
}

pub struct BrandKind;

impl EntityKind for BrandKind {
    type Id = BrandId;
    type Entity = Brand;
    type Draft = NewBrand;
    type Patch = BrandPatch;

    const NAME: &'static str = "brand";
    const COLLECTION: &'static str = "brands";

    fn id(entity: &Brand) -> Option<BrandId> {
        entity.brand_id
    }

    fn validate_draft(draft: &NewBrand) -> Result<(), String> {
        if draft.brand_name.trim().is_empty() {
            return Err("brand name must not be empty".into());
        }
        Ok(())
    }

    fn is_duplicate(existing: &Brand, draft: &NewBrand) -> bool {
        existing.brand_name == draft.brand_name
    }

    fn prune_patch(patch: BrandPatch) -> BrandPatch {
        BrandPatch {
            brand_name: non_blank(patch.brand_name),
        }
    }

    fn patch_is_empty(patch: &BrandPatch) -> bool {
        patch.brand_name.is_none()
    }

    fn columns() -> &'static [&'static str] {
        &["ID", "Brand"]
    }

    fn row(entity: &Brand) -> Vec<String> {
        vec![display_id(entity.brand_id), entity.brand_name.clone()]
    }

    fn summary(entity: &Brand) -> String {
        entity.brand_name.clone()
    }
}

pub struct ModelKind;

impl EntityKind for ModelKind {
    type Id = ModelId;
    type Entity = Model;
    type Draft = NewModel;
    type Patch = ModelPatch;

    const NAME: &'static str = "model";
    const COLLECTION: &'static str = "models";

    fn id(entity: &Model) -> Option<ModelId> {
        entity.model_id
    }

    fn validate_draft(draft: &NewModel) -> Result<(), String> {
        if draft.model_name.trim().is_empty() {
            return Err("model name must not be empty".into());
        }
        Ok(())
    }

    fn is_duplicate(existing: &Model, draft: &NewModel) -> bool {
        existing.model_name == draft.model_name
    }

    fn prune_patch(patch: ModelPatch) -> ModelPatch {
        ModelPatch {
            model_name: non_blank(patch.model_name),
        }
    }

    fn patch_is_empty(patch: &ModelPatch) -> bool {
        patch.model_name.is_none()
    }

    fn columns() -> &'static [&'static str] {
        &["ID", "Model"]
    }

    fn row(entity: &Model) -> Vec<String> {
        vec![display_id(entity.model_id), entity.model_name.clone()]
    }

    fn summary(entity: &Model) -> String {
        entity.model_name.clone()
    }
}

pub struct ProductKind;

impl EntityKind for ProductKind {
    type Id = ProductId;
    type Entity = Product;
    type Draft = NewProduct;
    type Patch = ProductPatch;

    const NAME: &'static str = "product";
    const COLLECTION: &'static str = "products";

    fn id(entity: &Product) -> Option<ProductId> {
        Some(entity.product_id)
    }

    fn validate_draft(draft: &NewProduct) -> Result<(), String> {
        let mut problems = Vec::new();
        if draft.name.trim().is_empty() {
            problems.push("name must not be empty");
        }
        if draft.current_price.is_nan() || draft.current_price <= 0.0 {
            problems.push("price must be positive");
        }
        if draft.stock_quantity <= 0 {
            problems.push("stock quantity must be positive");
        }
        if !draft.brand_id.is_positive() {
            problems.push("brand id must be positive");
        }
        if !draft.model_id.is_positive() {
            problems.push("model id must be positive");
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(format!("invalid product: {}", problems.join(", ")))
        }
    }

    fn is_duplicate(existing: &Product, draft: &NewProduct) -> bool {
        existing.name == draft.name
            && existing.brand.brand_id == Some(draft.brand_id)
            && existing.model.model_id == Some(draft.model_id)
    }

    fn prune_patch(patch: ProductPatch) -> ProductPatch {
        ProductPatch {
            name: non_blank(patch.name),
            ..patch
        }
    }

    fn patch_is_empty(patch: &ProductPatch) -> bool {
        patch.name.is_none()
            && patch.current_price.is_none()
            && patch.stock_quantity.is_none()
            && patch.brand_id.is_none()
            && patch.model_id.is_none()
    }

    fn columns() -> &'static [&'static str] {
        &["ID", "Name", "Price", "Quantity", "Brand", "Model"]
    }

    fn row(entity: &Product) -> Vec<String> {
        vec![
            entity.product_id.to_string(),
            entity.name.clone(),
            entity.current_price.to_string(),
            entity.stock_quantity.to_string(),
            entity.brand.brand_name.clone(),
            entity.model.model_name.clone(),
        ]
    }

    fn summary(entity: &Product) -> String {
        format!(
            "{}, brand: {}, model: {}, price: {}, quantity: {}",
            entity.name,
            entity.brand.brand_name,
            entity.model.model_name,
            entity.current_price,
            entity.stock_quantity
        )
    }
}
