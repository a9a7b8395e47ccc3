//! Demo grocery catalog served by the `memory` backend.

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;

use storefront_core::domain::category::{Category, CategoryId};
use storefront_core::domain::product::{Product, ProductId};

struct DemoProduct {
    id: &'static str,
    title: &'static str,
    brand: Option<&'static str>,
    category: &'static str,
    /// Price in cents.
    price: i64,
    discount: Option<i64>,
    stock: u32,
    featured: bool,
    /// Day of March 2024 the product was listed.
    listed_on: u32,
}

const DEMO_CATEGORIES: &[(&str, &str, &str)] = &[
    ("cat-bebidas", "Bebidas", "Aguas, jugos y refrescos"),
    ("cat-electro", "Electrodomesticos", "Linea blanca y pequenos aparatos"),
    ("cat-lacteos", "Lacteos", "Leche, yogurt y quesos"),
    ("cat-limpieza", "Limpieza", "Cuidado del hogar"),
    ("cat-panaderia", "Panaderia", "Pan de caja y bolleria"),
];

const DEMO_PRODUCTS: &[DemoProduct] = &[
    DemoProduct {
        id: "prod-leche-entera",
        title: "Leche Entera 1L",
        brand: Some("LaLechera"),
        category: "Lacteos",
        price: 2850,
        discount: None,
        stock: 40,
        featured: true,
        listed_on: 2,
    },
    DemoProduct {
        id: "prod-leche-deslactosada",
        title: "Leche Deslactosada 1L",
        brand: Some("Lala"),
        category: "Lacteos",
        price: 3190,
        discount: Some(10),
        stock: 8,
        featured: false,
        listed_on: 5,
    },
    DemoProduct {
        id: "prod-yogurt-fresa",
        title: "Yogurt de Fresa 1kg",
        brand: Some("Danone"),
        category: "Lacteos",
        price: 5400,
        discount: None,
        stock: 0,
        featured: false,
        listed_on: 11,
    },
    DemoProduct {
        id: "prod-queso-oaxaca",
        title: "Queso Oaxaca 400g",
        brand: None,
        category: "Lacteos",
        price: 11900,
        discount: Some(15),
        stock: 12,
        featured: false,
        listed_on: 14,
    },
    DemoProduct {
        id: "prod-pan-blanco",
        title: "Pan Blanco Grande",
        brand: Some("Bimbo"),
        category: "Panaderia",
        price: 4890,
        discount: None,
        stock: 25,
        featured: false,
        listed_on: 1,
    },
    DemoProduct {
        id: "prod-conchas",
        title: "Conchas de Vainilla 4pz",
        brand: Some("Bimbo"),
        category: "Panaderia",
        price: 3950,
        discount: Some(5),
        stock: 6,
        featured: false,
        listed_on: 20,
    },
    DemoProduct {
        id: "prod-agua-mineral",
        title: "Agua Mineral 2L",
        brand: Some("Topo Chico"),
        category: "Bebidas",
        price: 3200,
        discount: None,
        stock: 60,
        featured: false,
        listed_on: 3,
    },
    DemoProduct {
        id: "prod-jugo-naranja",
        title: "Jugo de Naranja 1L",
        brand: Some("Jumex"),
        category: "Bebidas",
        price: 2990,
        discount: Some(20),
        stock: 18,
        featured: true,
        listed_on: 22,
    },
    DemoProduct {
        id: "prod-detergente",
        title: "Detergente Liquido 5L",
        brand: Some("Ariel"),
        category: "Limpieza",
        price: 24900,
        discount: Some(12),
        stock: 9,
        featured: false,
        listed_on: 9,
    },
    DemoProduct {
        id: "prod-cloro",
        title: "Cloro 950ml",
        brand: Some("Cloralex"),
        category: "Limpieza",
        price: 2450,
        discount: None,
        stock: 30,
        featured: false,
        listed_on: 16,
    },
    DemoProduct {
        id: "prod-licuadora",
        title: "Licuadora 10 Velocidades",
        brand: Some("Oster"),
        category: "Electrodomesticos",
        price: 89900,
        discount: Some(25),
        stock: 4,
        featured: true,
        listed_on: 25,
    },
    DemoProduct {
        id: "prod-refrigerador",
        title: "Refrigerador 11 pies",
        brand: Some("Mabe"),
        category: "Electrodomesticos",
        price: 1_249_900,
        discount: None,
        stock: 2,
        featured: false,
        listed_on: 28,
    },
];

fn listed_at(day: u32) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(2024, 3, day, 9, 0, 0).single()
}

pub fn demo_categories() -> Vec<Category> {
    DEMO_CATEGORIES
        .iter()
        .map(|(id, name, description)| Category {
            id: CategoryId((*id).to_string()),
            name: (*name).to_string(),
            description: Some((*description).to_string()),
            image: None,
            product_count: 0,
        })
        .collect()
}

pub fn demo_products() -> Vec<Product> {
    DEMO_PRODUCTS
        .iter()
        .map(|demo| Product {
            id: ProductId(demo.id.to_string()),
            title: demo.title.to_string(),
            brand: demo.brand.map(str::to_string),
            category: demo.category.to_string(),
            price: Decimal::new(demo.price, 2),
            discount: demo.discount.map(Decimal::from),
            stock: demo.stock,
            image: None,
            created_at: listed_at(demo.listed_on),
            featured: demo.featured.then_some(true),
            rating: None,
        })
        .collect()
}
