use crate::domain::model::RouteTable;

pub const ROUTE_INDENT: &str = "    ";

/// One nginx `location` block forwarding `/<service>/` to `<service>:<port>`.
pub fn render_route(service: &str, port: u16) -> String {
    format!(
        "{indent}location /{s}/ {{rewrite /{s}/(.*) /$1 break; proxy_pass http://{s}:{port};}} #{s}_route",
        indent = ROUTE_INDENT,
        s = service,
        port = port,
    )
}

pub fn emit_routes(routes: &RouteTable, out: &mut Vec<u8>) {
    for (service, port) in routes.iter() {
        push_line(out, render_route(service, port).as_bytes());
    }
}

pub fn push_line(out: &mut Vec<u8>, line: &[u8]) {
    out.extend_from_slice(line);
    out.push(b'\n');
}
