use courier_derive::Endpoint;

#[derive(Endpoint)]
#[endpoint(Serialization)]
struct Orders;

fn main() {
    let _ = Orders;
}
