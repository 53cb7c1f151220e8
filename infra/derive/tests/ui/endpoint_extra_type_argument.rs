use courier_derive::Endpoint;

#[derive(Endpoint)]
#[endpoint(EndpointName<String>)]
struct Orders;

fn main() {
    let _ = Orders;
}
