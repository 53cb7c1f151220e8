use courier_derive::Endpoint;

#[derive(Endpoint)]
#[endpoint(ContainerTypeToUse)]
struct Orders;

fn main() {
    let _ = Orders;
}
