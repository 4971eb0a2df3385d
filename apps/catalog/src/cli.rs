//! Command-line forms for each entity kind and the generic dispatch that
//! drives a list controller from them.

use std::io::{self, Write};

use clap::Subcommand;
use client_core::{BrandKind, EntityKind, ListController, ModelKind, ProductKind};
use shared::domain::{
    BrandId, BrandPatch, ModelId, ModelPatch, NewBrand, NewModel, NewProduct, ProductId,
    ProductPatch,
};

use crate::render;

/// Brands and models only carry a name.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum NamedAction {
    /// Reload and print the list
    List,
    /// Look a record up by id
    Find {
        #[arg(allow_negative_numbers = true)]
        id: i64,
    },
    Create {
        #[arg(long)]
        name: String,
    },
    /// Rename a record
    Update {
        #[arg(allow_negative_numbers = true)]
        id: i64,
        #[arg(long)]
        name: Option<String>,
    },
    Delete {
        #[arg(allow_negative_numbers = true)]
        id: i64,
    },
    /// Dismiss the pending error
    Clear,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ProductAction {
    /// Reload and print the list
    List,
    /// Look a product up by id
    Find {
        #[arg(allow_negative_numbers = true)]
        id: i64,
    },
    Create {
        #[arg(long)]
        name: String,
        #[arg(long, allow_negative_numbers = true)]
        price: f64,
        #[arg(long, allow_negative_numbers = true)]
        quantity: i64,
        #[arg(long, allow_negative_numbers = true)]
        brand_id: i64,
        #[arg(long, allow_negative_numbers = true)]
        model_id: i64,
    },
    /// Change any subset of a product's fields
    Update {
        #[arg(allow_negative_numbers = true)]
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, allow_negative_numbers = true)]
        price: Option<f64>,
        #[arg(long, allow_negative_numbers = true)]
        quantity: Option<i64>,
        #[arg(long, allow_negative_numbers = true)]
        brand_id: Option<i64>,
        #[arg(long, allow_negative_numbers = true)]
        model_id: Option<i64>,
    },
    Delete {
        #[arg(allow_negative_numbers = true)]
        id: i64,
    },
    /// Dismiss the pending error
    Clear,
}

/// A parsed form submission for kind `K`.
pub enum Action<K: EntityKind> {
    List,
    Find(K::Id),
    Create(K::Draft),
    Update(K::Id, K::Patch),
    Delete(K::Id),
    Clear,
}

impl NamedAction {
    pub fn into_brand_action(self) -> Action<BrandKind> {
        match self {
            Self::List => Action::List,
            Self::Find { id } => Action::Find(BrandId(id)),
            Self::Create { name } => Action::Create(NewBrand { brand_name: name }),
            Self::Update { id, name } => Action::Update(BrandId(id), BrandPatch { brand_name: name }),
            Self::Delete { id } => Action::Delete(BrandId(id)),
            Self::Clear => Action::Clear,
        }
    }

    pub fn into_model_action(self) -> Action<ModelKind> {
        match self {
            Self::List => Action::List,
            Self::Find { id } => Action::Find(ModelId(id)),
            Self::Create { name } => Action::Create(NewModel { model_name: name }),
            Self::Update { id, name } => Action::Update(ModelId(id), ModelPatch { model_name: name }),
            Self::Delete { id } => Action::Delete(ModelId(id)),
            Self::Clear => Action::Clear,
        }
    }
}

impl ProductAction {
    pub fn into_action(self) -> Action<ProductKind> {
        match self {
            Self::List => Action::List,
            Self::Find { id } => Action::Find(ProductId(id)),
            Self::Create {
                name,
                price,
                quantity,
                brand_id,
                model_id,
            } => Action::Create(NewProduct {
                name,
                current_price: price,
                stock_quantity: quantity,
                brand_id: BrandId(brand_id),
                model_id: ModelId(model_id),
            }),
            Self::Update {
                id,
                name,
                price,
                quantity,
                brand_id,
                model_id,
            } => Action::Update(
                ProductId(id),
                ProductPatch {
                    name,
                    current_price: price,
                    stock_quantity: quantity,
                    brand_id: brand_id.map(BrandId),
                    model_id: model_id.map(ModelId),
                },
            ),
            Self::Delete { id } => Action::Delete(ProductId(id)),
            Self::Clear => Action::Clear,
        }
    }
}

/// Runs one form submission and re-renders what it touched. Returns whether
/// the command itself went through.
pub async fn execute<K: EntityKind>(
    controller: &ListController<K>,
    action: Action<K>,
    out: &mut impl Write,
    err_out: &mut impl Write,
) -> io::Result<bool> {
    let succeeded = match action {
        Action::List => controller.refresh().await.is_success(),
        Action::Find(id) => match controller.find(Some(id)).await {
            Some(entity) => {
                render::found::<K>(out, &entity)?;
                true
            }
            None => false,
        },
        Action::Create(draft) => controller.create(draft).await.is_success(),
        Action::Update(id, patch) => controller.update(Some(id), patch).await.is_success(),
        Action::Delete(id) => controller.delete(Some(id)).await.is_success(),
        Action::Clear => {
            controller.clear_error().await;
            true
        }
    };

    let snapshot = controller.snapshot().await;
    render::table::<K>(out, &snapshot.items)?;
    if let Some(err) = &snapshot.last_error {
        render::error_popup(err_out, err)?;
    }
    Ok(succeeded)
}

/// A single submission against a fresh controller. A valid `create` loads the
/// current records first for the duplicate check; nothing else touches the
/// list beforehand. Fails if any error is left pending.
pub async fn run_once<K: EntityKind>(
    controller: &ListController<K>,
    action: Action<K>,
    out: &mut impl Write,
    err_out: &mut impl Write,
) -> io::Result<bool> {
    if let Action::Create(draft) = &action {
        if K::validate_draft(draft).is_ok() {
            controller.refresh().await;
        }
    }
    let succeeded = execute(controller, action, out, err_out).await?;
    Ok(succeeded && controller.last_error().await.is_none())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use shared::domain::Brand;

    use super::*;
    use crate::test_support::StubRepository;

    fn ashley() -> Brand {
        Brand {
            brand_id: Some(BrandId(1)),
            brand_name: "Ashley".into(),
        }
    }

    fn brands(
        repo: StubRepository<BrandKind>,
    ) -> (Arc<StubRepository<BrandKind>>, ListController<BrandKind>) {
        let repo = Arc::new(repo);
        let controller = ListController::<BrandKind>::new(repo.clone());
        (repo, controller)
    }

    async fn run(
        controller: &ListController<BrandKind>,
        action: Action<BrandKind>,
    ) -> (bool, String) {
        let mut out = Vec::new();
        let mut err_out = Vec::new();
        let ok = run_once(controller, action, &mut out, &mut err_out)
            .await
            .expect("write to buffers");
        (ok, String::from_utf8(err_out).expect("utf8"))
    }

    #[tokio::test]
    async fn invalid_id_is_rejected_before_any_request() {
        let (repo, controller) = brands(StubRepository::unreachable_list());

        let (ok, errors) = run(&controller, Action::Delete(BrandId(-1))).await;

        assert!(!ok);
        assert!(repo.calls().await.is_empty());
        assert_eq!(errors, "[invalid input] enter a positive brand id to delete\n");
    }

    #[tokio::test]
    async fn clear_and_find_skip_the_list_load() {
        let (repo, controller) = brands(StubRepository::unreachable_list());

        let (ok, errors) = run(&controller, Action::Clear).await;
        assert!(ok);
        assert!(errors.is_empty());

        let (ok, _) = run(&controller, Action::Find(BrandId(1))).await;
        assert!(!ok);
        assert_eq!(repo.calls().await, vec!["get_by_id"]);
    }

    #[tokio::test]
    async fn create_loads_records_for_the_duplicate_check() {
        let (repo, controller) = brands(StubRepository::with_records(vec![ashley()]));

        let (ok, errors) = run(
            &controller,
            Action::Create(NewBrand {
                brand_name: "Ashley".into(),
            }),
        )
        .await;

        assert!(!ok);
        assert_eq!(repo.calls().await, vec!["list"]);
        assert_eq!(errors, "[conflict] brand already exists\n");
    }

    #[tokio::test]
    async fn new_brand_is_created_and_listed() {
        let (repo, controller) = brands(StubRepository::with_records(vec![ashley()]));
        repo.will_create(Brand {
            brand_id: Some(BrandId(2)),
            brand_name: "IKEA".into(),
        })
        .await;

        let (ok, errors) = run(
            &controller,
            Action::Create(NewBrand {
                brand_name: "IKEA".into(),
            }),
        )
        .await;

        assert!(ok);
        assert!(errors.is_empty());
        assert_eq!(repo.calls().await, vec!["list", "create", "list"]);
        assert_eq!(controller.items().await.len(), 2);
    }

    #[tokio::test]
    async fn blank_create_sends_nothing() {
        let (repo, controller) = brands(StubRepository::with_records(vec![ashley()]));

        let (ok, _) = run(&controller, Action::Create(NewBrand::default())).await;

        assert!(!ok);
        assert!(repo.calls().await.is_empty());
    }

    #[test]
    fn product_update_maps_only_given_fields() {
        let action = ProductAction::Update {
            id: 4,
            name: None,
            price: Some(950.0),
            quantity: None,
            brand_id: Some(2),
            model_id: None,
        }
        .into_action();

        match action {
            Action::Update(id, patch) => {
                assert_eq!(id, ProductId(4));
                assert_eq!(
                    patch,
                    ProductPatch {
                        current_price: Some(950.0),
                        brand_id: Some(BrandId(2)),
                        ..ProductPatch::default()
                    }
                );
            }
            _ => panic!("expected update"),
        }
    }

    #[test]
    fn named_create_builds_model_draft() {
        let action = NamedAction::Create {
            name: "Corner".into(),
        }
        .into_model_action();

        assert!(matches!(
            action,
            Action::Create(NewModel { ref model_name }) if model_name == "Corner"
        ));
    }
}
