//! Lists, fixed arrays, raw JSON and strict decoding in one document.
//!
//! Run with: `cargo run --example inventory`

use structon::{from_str, from_str_with_options, schema, to_string, DecodeOptions, NodeList};

#[derive(Debug, Default)]
struct Item {
    sku: Option<String>,
    quantity: i32,
    price: f64,
}

schema! {
    Item {
        sku: string,
        quantity: int,
        price: double,
    }
}

#[derive(Debug, Default)]
struct Inventory {
    location: Option<String>,
    items: NodeList<Item>,
    bins: [i32; 3],
    codes: NodeList<String>,
    vendor: Option<String>,
}

schema! {
    Inventory {
        location: string,
        items: list(Item),
        bins: array(int, 3),
        codes: list(String),
        vendor: json as "vendor_info",
    }
}

fn main() -> structon::Result<()> {
    let text = r#"{
        "location": "aisle 7",
        "items": [
            {"sku": "WIDGET-001", "quantity": 12, "price": 3.5},
            {"sku": "GADGET-002", "quantity": 3, "price": 19.0}
        ],
        "bins": [4, 9],
        "codes": ["a1", "b2", "c3"],
        "vendor_info": {"name": "Acme", "rating": 5}
    }"#;

    let inventory = from_str::<Inventory>(text)?.expect("document is not null");

    for item in inventory.items.iter().flatten() {
        println!(
            "{:12} x{:<3} @ {:.2}",
            item.sku.as_deref().unwrap_or("?"),
            item.quantity,
            item.price
        );
    }
    // The third bin was absent from the document and stays zero.
    println!("bins: {:?}", inventory.bins);
    println!("vendor (raw): {}", inventory.vendor.as_deref().unwrap_or("-"));

    println!("compact: {}", to_string(&*inventory)?);

    // Strict mode turns a wrong-typed field into an error.
    let broken = r#"{"location": 7}"#;
    match from_str_with_options::<Inventory>(broken, &DecodeOptions::strict()) {
        Err(error) => println!("strict decode refused: {}", error),
        Ok(_) => println!("unexpectedly decoded"),
    }

    Ok(())
}
