use rust_decimal::Decimal;

use storefront_core::config::{BackendConfig, BackendProvider};
use storefront_core::domain::category::{Category, CategoryDraft, CategoryId};
use storefront_core::domain::product::{ProductDraft, ProductId};
use storefront_core::errors::DomainError;
use storefront_core::gateway::{CatalogReader, CatalogWriter, GatewayError};
use storefront_core::{suggest, CatalogStore, FilterSelection, ProductQuery, SortSelection};
use storefront_gateway::{open_reader, InMemoryCatalogGateway, RestCatalogGateway};

fn draft(title: &str, category: &str, price: i64, discount: Option<i64>) -> ProductDraft {
    ProductDraft {
        title: title.to_string(),
        brand: Some("Casera".to_string()),
        category: category.to_string(),
        price: Decimal::from(price),
        discount: discount.map(Decimal::from),
        stock: 3,
        image: None,
        featured: None,
    }
}

#[tokio::test]
async fn search_is_case_insensitive_over_title_and_brand() {
    let gateway = InMemoryCatalogGateway::demo();

    let by_title = gateway.search_products("LECHE", None).await.expect("search by title");
    assert_eq!(by_title.len(), 2);

    let by_brand = gateway.search_products("bimbo", None).await.expect("search by brand");
    let titles: Vec<&str> = by_brand.iter().map(|product| product.title.as_str()).collect();
    assert_eq!(titles, ["Conchas de Vainilla 4pz", "Pan Blanco Grande"]);

    let limited = gateway.search_products("l", Some(2)).await.expect("limited search");
    assert_eq!(limited.len(), 2);

    assert!(gateway.search_products("  ", None).await.expect("blank search").is_empty());
}

#[tokio::test]
async fn listing_by_category_ignores_case() {
    let gateway = InMemoryCatalogGateway::demo();
    let lacteos = gateway.list_products(Some("lacteos"), None).await.expect("list lacteos");
    assert_eq!(lacteos.len(), 4);
    assert!(lacteos.iter().all(|product| product.category == "Lacteos"));
}

#[tokio::test]
async fn featured_products_are_discounted_or_flagged() {
    let gateway = InMemoryCatalogGateway::demo();
    let featured = gateway.featured_products(8).await.expect("featured");

    assert!(!featured.is_empty() && featured.len() <= 8);
    assert!(featured.iter().all(|product| product.on_discount() || product.is_featured()));
}

#[tokio::test]
async fn created_products_are_readable_and_searchable() {
    let gateway = InMemoryCatalogGateway::demo();
    let created = gateway
        .create_product(draft("  Tortillas de Maiz ", "panaderia", 25, Some(0)))
        .await
        .expect("create product");

    assert_eq!(created.title, "Tortillas de Maiz");
    assert_eq!(created.category, "Panaderia");
    assert!(created.created_at.is_some());

    let fetched = gateway.get_product(&created.id).await.expect("get product");
    assert_eq!(fetched, Some(created.clone()));

    let hits = gateway.search_products("tortillas", None).await.expect("search");
    assert_eq!(hits, vec![created]);
}

#[tokio::test]
async fn invalid_drafts_are_rejected() {
    let gateway = InMemoryCatalogGateway::demo();

    let over_discount =
        gateway.create_product(draft("Pan Dulce", "Panaderia", 10, Some(120))).await;
    assert!(matches!(
        over_discount,
        Err(GatewayError::Validation(DomainError::DiscountOutOfRange(_)))
    ));

    let negative = gateway.create_product(draft("Pan Dulce", "Panaderia", -1, None)).await;
    assert!(matches!(negative, Err(GatewayError::Validation(DomainError::NegativePrice(_)))));

    let unknown_category = gateway.create_product(draft("Clavos", "Ferreteria", 10, None)).await;
    assert!(matches!(unknown_category, Err(GatewayError::NotFound(_))));
}

#[tokio::test]
async fn update_and_delete_products() {
    let gateway = InMemoryCatalogGateway::demo();
    let id = ProductId("prod-cloro".to_string());

    let mut product = gateway.get_product(&id).await.expect("get").expect("demo product exists");
    let listed_at = product.created_at;
    product.discount = Some(Decimal::from(30));
    product.created_at = None;

    let updated = gateway.update_product(product).await.expect("update product");
    assert_eq!(updated.discount, Some(Decimal::from(30)));
    assert_eq!(updated.created_at, listed_at);

    gateway.delete_product(&id).await.expect("delete product");
    assert_eq!(gateway.get_product(&id).await.expect("get after delete"), None);
    assert!(matches!(gateway.delete_product(&id).await, Err(GatewayError::NotFound(_))));
}

#[tokio::test]
async fn category_with_products_cannot_be_deleted() {
    let gateway = InMemoryCatalogGateway::demo();

    let blocked = gateway.delete_category(&CategoryId("cat-lacteos".to_string())).await;
    assert!(matches!(blocked, Err(GatewayError::Conflict(ref message)) if message.contains("4")));

    let created = gateway
        .create_category(CategoryDraft {
            name: "Mascotas".to_string(),
            description: None,
            image: None,
        })
        .await
        .expect("create category");
    gateway.delete_category(&created.id).await.expect("empty category can be deleted");

    let duplicate = gateway
        .create_category(CategoryDraft {
            name: "bebidas".to_string(),
            description: None,
            image: None,
        })
        .await;
    assert!(matches!(duplicate, Err(GatewayError::Conflict(_))));
}

#[tokio::test]
async fn categories_can_be_renamed_but_not_onto_another_name() {
    let gateway = InMemoryCatalogGateway::demo();
    let lacteos = Category {
        id: CategoryId("cat-lacteos".to_string()),
        name: "  Lacteos y Quesos ".to_string(),
        description: Some("Leche, yogurt, cremas y quesos".to_string()),
        image: Some("https://cdn.example.co/lacteos.png".to_string()),
        product_count: 0,
    };

    let updated = gateway.update_category(lacteos.clone()).await.expect("rename category");
    assert_eq!(updated.name, "Lacteos y Quesos");
    assert_eq!(updated.image.as_deref(), Some("https://cdn.example.co/lacteos.png"));

    let moved = gateway.list_products(Some("lacteos y quesos"), None).await.expect("list renamed");
    assert_eq!(moved.len(), 4);
    assert!(gateway.list_products(Some("Lacteos"), None).await.expect("list old").is_empty());

    let same_name_other_case = Category { name: "LACTEOS Y QUESOS".to_string(), ..lacteos.clone() };
    let recased = gateway.update_category(same_name_other_case).await.expect("recase own name");
    assert_eq!(recased.name, "LACTEOS Y QUESOS");

    let clash = Category { name: "bebidas".to_string(), ..lacteos.clone() };
    assert!(matches!(
        gateway.update_category(clash).await,
        Err(GatewayError::Conflict(ref message)) if message.contains("bebidas")
    ));

    let blank = Category { name: "  ".to_string(), ..lacteos.clone() };
    assert!(matches!(gateway.update_category(blank).await, Err(GatewayError::Validation(_))));

    let missing = Category {
        id: CategoryId("cat-ferreteria".to_string()),
        name: "Ferreteria".to_string(),
        ..lacteos
    };
    assert!(matches!(gateway.update_category(missing).await, Err(GatewayError::NotFound(_))));
}

#[tokio::test]
async fn search_treats_star_literally() {
    let gateway = InMemoryCatalogGateway::demo();
    assert!(gateway.search_products("le*", None).await.expect("star search").is_empty());

    let created = gateway
        .create_product(draft("Jabon 2*1", "Limpieza", 30, None))
        .await
        .expect("create product");
    let hits = gateway.search_products("2*1", None).await.expect("star search");
    assert_eq!(hits, vec![created]);
}

#[tokio::test]
async fn store_refresh_feeds_the_pipeline() {
    let gateway = InMemoryCatalogGateway::demo();
    let store = CatalogStore::default();
    let catalog = store.refresh(&gateway).await.expect("refresh from demo");

    let lacteos = catalog
        .categories()
        .iter()
        .find(|category| category.name == "Lacteos")
        .expect("lacteos category");
    assert_eq!(lacteos.product_count, 4);

    let query = ProductQuery {
        filter: FilterSelection::InStock,
        price_range: None,
        sort: SortSelection::PriceAsc,
    };
    let view = store.view(&query);
    assert!(view.iter().all(|product| product.stock > 0));
    assert!(view.windows(2).all(|pair| pair[0].final_price() <= pair[1].final_price()));
}

#[tokio::test]
async fn suggestions_over_backend_hits() {
    let gateway = InMemoryCatalogGateway::demo();
    let hits = gateway.search_products("le", Some(10)).await.expect("search");
    let suggestions = suggest("le", &hits);

    assert!(suggestions.iter().any(|s| s.text() == "Leche Entera 1L"));
    assert!(suggestions.iter().any(|s| s.text() == "LaLechera"));
}

#[tokio::test]
async fn unreachable_rest_backend_reports_transport_error() {
    let config = BackendConfig {
        provider: BackendProvider::Rest,
        url: Some("http://127.0.0.1:9".to_string()),
        api_key: Some("anon".to_string().into()),
        timeout_secs: 2,
    };
    let gateway = RestCatalogGateway::from_config(&config).expect("gateway from config");

    let result = gateway.list_categories().await;
    assert!(matches!(result, Err(GatewayError::Transport(_))));
}

#[tokio::test]
async fn memory_provider_opens_demo_reader() {
    let config = BackendConfig {
        provider: BackendProvider::Memory,
        url: None,
        api_key: None,
        timeout_secs: 10,
    };
    let reader = open_reader(&config).expect("memory reader");
    assert!(!reader.list_categories().await.expect("categories").is_empty());

    let rest_without_url = BackendConfig { provider: BackendProvider::Rest, ..config };
    assert!(open_reader(&rest_without_url).is_err());
}
